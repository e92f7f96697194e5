use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The input widget a question is answered with. The validator keys its
/// required-field rules off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    Text,
    Dropdown,
    Currency,
    Percentage,
    Date,
    CheckboxGroup,
    SelectGroup,
    CardSelect,
    ButtonGroup,
    Repeater,
    FileUpload,
    Textarea,
    Radio,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Dropdown => "dropdown",
            Self::Currency => "currency",
            Self::Percentage => "percentage",
            Self::Date => "date",
            Self::CheckboxGroup => "checkbox-group",
            Self::SelectGroup => "select-group",
            Self::CardSelect => "card-select",
            Self::ButtonGroup => "button-group",
            Self::Repeater => "repeater",
            Self::FileUpload => "file-upload",
            Self::Textarea => "textarea",
            Self::Radio => "radio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "dropdown" => Some(Self::Dropdown),
            "currency" => Some(Self::Currency),
            "percentage" => Some(Self::Percentage),
            "date" => Some(Self::Date),
            "checkbox-group" => Some(Self::CheckboxGroup),
            "select-group" => Some(Self::SelectGroup),
            "card-select" => Some(Self::CardSelect),
            "button-group" => Some(Self::ButtonGroup),
            "repeater" => Some(Self::Repeater),
            "file-upload" => Some(Self::FileUpload),
            "textarea" => Some(Self::Textarea),
            "radio" => Some(Self::Radio),
            _ => None,
        }
    }

    /// Whether answers must be numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Currency | Self::Percentage)
    }

    /// Message shown when a required answer is missing or invalid.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Currency => "Please enter a valid amount",
            Self::Percentage => "Please enter a valid percentage",
            Self::CheckboxGroup => "Please select at least one option",
            Self::Repeater => "Please add at least one entry",
            Self::FileUpload => "Please upload the required document",
            _ => "This field is required",
        }
    }
}

/// Question-specific checks beyond the required-field rules.
///
/// Each variant carries the message reported when the check fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustomValidator {
    /// Text answer must match a regular expression.
    Pattern { pattern: String, message: String },

    /// Trimmed text answer must have at least `min` characters.
    MinLength { min: usize, message: String },

    /// Numeric answer may not exceed the number stored at `other`.
    NotExceeding { other: String, message: String },

    /// Numeric answer plus the number stored at `other` may not exceed `limit`.
    SumAtMost {
        other: String,
        limit: Decimal,
        message: String,
    },
}

/// Optional validation metadata attached to a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    /// Replaces the kind's default required-field message.
    pub message: Option<String>,
    pub custom: Option<CustomValidator>,
}

/// A single question. `id` doubles as the form path of its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub label: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub validation: Option<ValidationRule>,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: QuestionKind,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: false,
            options: Vec::new(),
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(
        mut self,
        options: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rule(
        mut self,
        rule: ValidationRule,
    ) -> Self {
        self.validation = Some(rule);
        self
    }

    pub fn with_custom(
        self,
        custom: CustomValidator,
    ) -> Self {
        let rule = ValidationRule {
            custom: Some(custom),
            ..self.validation.clone().unwrap_or_default()
        };
        self.with_rule(rule)
    }

    /// Message reported when a required answer is missing.
    pub fn required_message(&self) -> String {
        self.validation
            .as_ref()
            .and_then(|rule| rule.message.clone())
            .unwrap_or_else(|| self.kind.default_message().to_string())
    }
}

/// An ordered group of questions shown as one questionnaire step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            questions,
        }
    }

    pub fn required_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.required)
    }
}
