//! Tri-state field updates for partial modifications.
//!
//! JSON gives three shapes for a field in a partial update: missing, `null`,
//! or a value. [`Patch`] keeps those apart so "leave as is" and "clear it" do
//! not collapse into the same `Option::None`.

use serde::{Deserialize, Deserializer};

/// One field of a partial update.
///
/// Deserialise fields of this type with `#[serde(default)]`: a missing key
/// yields [`Patch::Absent`], `null` yields [`Patch::Clear`], and a value
/// yields [`Patch::Set`].
///
/// # Examples
/// ```
/// use serde::Deserialize;
/// use storefront::domain::Patch;
///
/// #[derive(Deserialize)]
/// struct Body {
///     #[serde(default)]
///     description: Patch<String>,
/// }
///
/// let absent: Body = serde_json::from_str("{}").unwrap();
/// assert_eq!(absent.description, Patch::Absent);
/// let cleared: Body = serde_json::from_str(r#"{"description":null}"#).unwrap();
/// assert_eq!(cleared.description, Patch::Clear);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

/// Raised when a non-nullable field receives [`Patch::Clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFieldCleared(pub &'static str);

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Resolve against a required field's current value.
    pub fn apply_required(
        self,
        current: T,
        field: &'static str,
    ) -> Result<T, RequiredFieldCleared> {
        match self {
            Self::Absent => Ok(current),
            Self::Clear => Err(RequiredFieldCleared(field)),
            Self::Set(value) => Ok(value),
        }
    }

    /// Resolve against a nullable field's current value.
    pub fn apply_nullable(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Absent => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Clear => Patch::Clear,
            Self::Set(value) => Patch::Set(f(value)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(inner) => Self::Set(inner),
            None => Self::Clear,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        stock: Patch<i32>,
    }

    #[rstest]
    #[case("{}", Patch::Absent)]
    #[case(r#"{"stock":null}"#, Patch::Clear)]
    #[case(r#"{"stock":4}"#, Patch::Set(4))]
    fn deserialises_three_states(#[case] raw: &str, #[case] expected: Patch<i32>) {
        let body: Body = serde_json::from_str(raw).expect("valid json");
        assert_eq!(body.stock, expected);
    }

    #[test]
    fn required_fields_reject_clear() {
        assert_eq!(Patch::<i32>::Absent.apply_required(3, "stock"), Ok(3));
        assert_eq!(Patch::Set(5).apply_required(3, "stock"), Ok(5));
        assert_eq!(
            Patch::<i32>::Clear.apply_required(3, "stock"),
            Err(RequiredFieldCleared("stock"))
        );
    }

    #[test]
    fn nullable_fields_accept_clear() {
        let current = Some("old".to_owned());
        assert_eq!(Patch::Absent.apply_nullable(current.clone()), current);
        assert_eq!(Patch::<String>::Clear.apply_nullable(current.clone()), None);
        assert_eq!(
            Patch::Set("new".to_owned()).apply_nullable(current),
            Some("new".to_owned())
        );
    }
}
