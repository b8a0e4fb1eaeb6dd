//! Template definitions: the field schema and storage keys of each canvas kind.
//!
//! Templates are static data. A `Workbench` is opened for exactly one template
//! and never touches another template's storage keys.

use crate::snapshot::{FieldValue, Snapshot};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown template: {0} (expected \"bmc\" or \"fpr\")")]
    Unknown(String),
}

/// Which thinking template a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    BusinessModelCanvas,
    FirstPrincipleReasoning,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [
        TemplateKind::BusinessModelCanvas,
        TemplateKind::FirstPrincipleReasoning,
    ];

    /// Short identifier used on the command line and in JS (`bmc` / `fpr`)
    pub fn slug(&self) -> &'static str {
        match self {
            TemplateKind::BusinessModelCanvas => "bmc",
            TemplateKind::FirstPrincipleReasoning => "fpr",
        }
    }

    pub fn template(&self) -> &'static Template {
        match self {
            TemplateKind::BusinessModelCanvas => &BUSINESS_MODEL_CANVAS,
            TemplateKind::FirstPrincipleReasoning => &FIRST_PRINCIPLE_REASONING,
        }
    }
}

impl Display for TemplateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TemplateKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bmc" | "business-model-canvas" => Ok(TemplateKind::BusinessModelCanvas),
            "fpr" | "first-principle-reasoning" => Ok(TemplateKind::FirstPrincipleReasoning),
            _ => Err(TemplateError::Unknown(s.to_string())),
        }
    }
}

/// Declared shape of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// A single free-text value, defaults to `""`
    Text,
    /// Bullet items, defaults to `[""]`
    List,
}

impl FieldShape {
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldShape::Text => FieldValue::Text(String::new()),
            FieldShape::List => FieldValue::List(vec![String::new()]),
        }
    }
}

/// One field of a template.
#[derive(Debug)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    /// Guiding question shown under the label
    pub prompt: &'static str,
    pub shape: FieldShape,
}

/// Static description of a template kind.
#[derive(Debug)]
pub struct Template {
    pub kind: TemplateKind,
    pub label: &'static str,
    /// Key of the multi-document store
    pub storage_key: &'static str,
    /// Key of the pre-multi-document single snapshot, if this template ever had one
    pub legacy_key: Option<&'static str>,
    /// Field whose text names a document in listings
    pub title_field: &'static str,
    /// Every field, title first
    pub fields: &'static [FieldSpec],
    pub export_file_name: &'static str,
    /// Caption printed under the blocks
    pub tagline: &'static str,
    example: &'static [(&'static str, Example)],
}

#[derive(Debug)]
enum Example {
    Text(&'static str),
    List(&'static [&'static str]),
}

impl Template {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields other than the title, in display order
    pub fn blocks(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.key != self.title_field)
    }

    /// Every declared field at its empty default.
    pub fn default_snapshot(&self) -> Snapshot {
        self.fields
            .iter()
            .map(|f| (f.key, f.shape.default_value()))
            .collect()
    }

    /// Defaults for missing fields, `snapshot` for everything it carries.
    ///
    /// Unknown keys in `snapshot` are kept.
    pub fn with_defaults(&self, snapshot: &Snapshot) -> Snapshot {
        self.default_snapshot().overlaid_with(snapshot)
    }

    /// Filled-in sample content
    pub fn example_snapshot(&self) -> Snapshot {
        let example: Snapshot = self
            .example
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Example::Text(s) => FieldValue::text(*s),
                    Example::List(items) => FieldValue::list(items.iter().copied()),
                };
                (*key, value)
            })
            .collect();
        self.with_defaults(&example)
    }

    /// Listing label for a snapshot: its title, or "Untitled"
    pub fn document_title<'a>(&self, snapshot: &'a Snapshot) -> &'a str {
        let title = snapshot.text(self.title_field).trim();
        if title.is_empty() { "Untitled" } else { title }
    }
}

pub static BUSINESS_MODEL_CANVAS: Template = Template {
    kind: TemplateKind::BusinessModelCanvas,
    label: "Business Model Canvas",
    storage_key: "canvasly-bmc-documents",
    legacy_key: Some("canvasly-bmc-data"),
    title_field: "title",
    fields: &[
        FieldSpec {
            key: "title",
            label: "Title",
            prompt: "Business or product name",
            shape: FieldShape::Text,
        },
        FieldSpec {
            key: "keyPartners",
            label: "Key Partners",
            prompt: "Who are our key partners and suppliers?",
            shape: FieldShape::List,
        },
        FieldSpec {
            key: "keyActivities",
            label: "Key Activities",
            prompt: "What key activities does our value proposition require?",
            shape: FieldShape::List,
        },
        FieldSpec {
            key: "keyResources",
            label: "Key Resources",
            prompt: "What key resources does our value proposition require?",
            shape: FieldShape::List,
        },
        FieldSpec {
            key: "valuePropositions",
            label: "Value Propositions",
            prompt: "What value do we deliver to the customer?",
            shape: FieldShape::List,
        },
        FieldSpec {
            key: "customerRelationships",
            label: "Customer Relationships",
            prompt: "What relationship does each segment expect?",
            shape: FieldShape::List,
        },
        FieldSpec {
            key: "channels",
            label: "Channels",
            prompt: "Through which channels do we reach our segments?",
            shape: FieldShape::List,
        },
        FieldSpec {
            key: "customerSegments",
            label: "Customer Segments",
            prompt: "For whom are we creating value?",
            shape: FieldShape::List,
        },
        FieldSpec {
            key: "costStructure",
            label: "Cost Structure",
            prompt: "What are the most important costs?",
            shape: FieldShape::List,
        },
        FieldSpec {
            key: "revenueStreams",
            label: "Revenue Streams",
            prompt: "For what value are customers willing to pay?",
            shape: FieldShape::List,
        },
    ],
    export_file_name: "business-model-canvas.json",
    tagline: "Think with clarity",
    example: &[
        ("title", Example::Text("Neighbourhood Coffee Roastery")),
        (
            "keyPartners",
            Example::List(&["Green bean importers", "Local bakeries", "Delivery couriers"]),
        ),
        (
            "keyActivities",
            Example::List(&["Roasting small batches", "Running the café", "Wholesale accounts"]),
        ),
        (
            "keyResources",
            Example::List(&["Roaster and café space", "Head roaster", "Loyal regulars"]),
        ),
        (
            "valuePropositions",
            Example::List(&["Beans roasted this week", "A third place to work and meet"]),
        ),
        (
            "customerRelationships",
            Example::List(&["Baristas who know your order", "Subscription with tasting notes"]),
        ),
        (
            "channels",
            Example::List(&["Café counter", "Online shop", "Farmers market stall"]),
        ),
        (
            "customerSegments",
            Example::List(&["Remote workers nearby", "Home brewers", "Local restaurants"]),
        ),
        (
            "costStructure",
            Example::List(&["Green beans", "Rent", "Staff", "Packaging"]),
        ),
        (
            "revenueStreams",
            Example::List(&["Drinks and pastries", "Bean subscriptions", "Wholesale contracts"]),
        ),
    ],
};

pub static FIRST_PRINCIPLE_REASONING: Template = Template {
    kind: TemplateKind::FirstPrincipleReasoning,
    label: "First Principle Reasoning",
    storage_key: "canvasly-fpr-documents",
    legacy_key: None,
    title_field: "problemName",
    fields: &[
        FieldSpec {
            key: "problemName",
            label: "Problem",
            prompt: "Problem or question name",
            shape: FieldShape::Text,
        },
        FieldSpec {
            key: "clarification",
            label: "Clarification",
            prompt: "What do you mean by...?",
            shape: FieldShape::Text,
        },
        FieldSpec {
            key: "probingAssumptions",
            label: "Probing assumptions",
            prompt: "What could we assume instead?",
            shape: FieldShape::Text,
        },
        FieldSpec {
            key: "probingReasons",
            label: "Probing reasons / evidence",
            prompt: "Why do you think this is true?",
            shape: FieldShape::Text,
        },
        FieldSpec {
            key: "implications",
            label: "Implications and consequences",
            prompt: "What effect would that have?",
            shape: FieldShape::Text,
        },
        FieldSpec {
            key: "differentViewpoints",
            label: "Different viewpoints",
            prompt: "What would be an alternative?",
            shape: FieldShape::Text,
        },
        FieldSpec {
            key: "questioningQuestion",
            label: "Questioning the original question",
            prompt: "What was the point of this question?",
            shape: FieldShape::Text,
        },
    ],
    export_file_name: "first-principle-reasoning.json",
    tagline: "Socratic questioning for first-principle thinking",
    example: &[
        ("problemName", Example::Text("Should we build feature X?")),
        (
            "clarification",
            Example::Text(
                "By 'feature X' we mean the new dashboard that shows real-time analytics. \
                 By 'we' we mean the product team with current bandwidth.",
            ),
        ),
        (
            "probingAssumptions",
            Example::Text(
                "We might assume users want more data on one screen; we could instead assume \
                 they want fewer, clearer metrics.",
            ),
        ),
        (
            "probingReasons",
            Example::Text(
                "User interviews showed requests for 'more numbers'; support tickets mentioned \
                 slow report generation.",
            ),
        ),
        (
            "implications",
            Example::Text(
                "If we build it: more engineering time and a new surface to maintain. \
                 If we don't: we keep focus on reliability.",
            ),
        ),
        (
            "differentViewpoints",
            Example::Text(
                "Engineering might prefer an API-first approach; support might prefer better \
                 export of existing reports.",
            ),
        ),
        (
            "questioningQuestion",
            Example::Text(
                "The real question might be: 'What's the smallest change that improves \
                 decisions?' rather than 'Build feature X or not?'.",
            ),
        ),
    ],
};
