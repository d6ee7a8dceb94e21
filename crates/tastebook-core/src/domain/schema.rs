//! Schema Descriptors
//!
//! One static descriptor per collection: table name, ordering, field list,
//! and the nouns used in notices. The resource manager is generic over
//! these instead of repeating itself per collection.

/// How a field is edited and coerced on submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Multi-line text
    LongText,
    /// Edited as text, submitted as an integer (0 when unparseable)
    Integer,
    /// ISO `YYYY-MM-DD` date
    Date,
    /// Public URL filled in by the upload coordinator
    ImageUrl,
}

/// Value a blank draft starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Empty,
    /// Today's date in ISO form
    Today,
    Literal(&'static str),
}

/// One editable field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_chars: Option<usize>,
    pub placeholder: &'static str,
    pub default: FieldDefault,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            max_chars: None,
            placeholder: "",
            default: FieldDefault::Empty,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    pub const fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = text;
        self
    }

    pub const fn default_to(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }
}

/// Backend ordering for `fetch_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: &'static str,
    pub ascending: bool,
}

impl SortOrder {
    pub const fn descending(field: &'static str) -> Self {
        Self { field, ascending: false }
    }
}

/// Static description of one managed collection
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    /// Backend table name
    pub table: &'static str,
    /// Lower-case singular noun, e.g. "blog post"
    pub noun: &'static str,
    /// Lower-case plural noun, e.g. "blog posts"
    pub plural: &'static str,
    /// Heading-case singular, e.g. "Blog Post"
    pub title: &'static str,
    /// Capitalized plural, e.g. "Blog Posts"
    pub title_plural: &'static str,
    pub order: SortOrder,
    /// Storage key prefix; `None` when the collection carries no image
    pub upload_prefix: Option<&'static str>,
    /// Admin list message when the collection is empty
    pub admin_empty_state: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field uploads write into, if the collection has one
    pub fn image_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.kind == FieldKind::ImageUrl)
    }

    /// Singular noun with a capital first letter, for sentences: "Blog post"
    pub fn sentence_noun(&self) -> String {
        let mut chars = self.noun.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn loading_placeholder(&self) -> String {
        format!("Loading {}...", self.plural)
    }

    pub fn public_empty_state(&self) -> String {
        format!("No {} available yet.", self.plural)
    }

    pub fn delete_prompt(&self) -> String {
        format!("Are you sure you want to delete this {}?", self.noun)
    }
}
