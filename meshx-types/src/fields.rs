//! Generic field flattening
//!
//! Payload messages enumerate their fields as ordered `(name, text)` pairs.
//! Values are always flat text: a nested message collapses into a single
//! `{name: value, ...}` line instead of expanding into rows of its own.

/// One displayed field of a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub value: String,
}

impl Field {
    pub fn new(name: &'static str, value: String) -> Self {
        Self { name, value }
    }
}

/// A message that can list its fields in declaration order
pub trait FieldSet {
    fn fields(&self) -> Vec<Field>;

    /// Single-line form used when this message is nested inside another
    fn flatten(&self) -> String {
        let inner: Vec<String> = self
            .fields()
            .into_iter()
            .map(|f| format!("{}: {}", f.name, f.value))
            .collect();
        format!("{{{}}}", inner.join(", "))
    }
}

/// Text form of a single field value, whatever its wire type
pub trait FieldText {
    fn to_field_text(&self) -> String;
}

macro_rules! display_field_text {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldText for $ty {
                fn to_field_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_field_text!(String, bool, u32, u64, i32, i64);

/// Bytes render as lowercase hex
impl FieldText for Vec<u8> {
    fn to_field_text(&self) -> String {
        hex::encode(self)
    }
}

impl FieldText for Vec<String> {
    fn to_field_text(&self) -> String {
        format!("[{}]", self.join(", "))
    }
}

impl FieldText for Vec<u64> {
    fn to_field_text(&self) -> String {
        let items: Vec<String> = self.iter().map(u64::to_string).collect();
        format!("[{}]", items.join(", "))
    }
}

/// Nested messages; an absent one renders as `{}`
impl<M: FieldSet> FieldText for Option<M> {
    fn to_field_text(&self) -> String {
        match self {
            Some(message) => message.flatten(),
            None => "{}".to_string(),
        }
    }
}
