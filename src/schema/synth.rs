/// Written in place of any field missing from a synthesized identifier.
pub const NULL_TOKEN: &str = "null";

#[derive(Debug, Clone, Copy)]
pub struct IdPart {
    /// Rendered as `label=value` when set.
    pub label: Option<&'static str>,
    pub column: &'static str,
    /// Prefix the value with the feed scope, as `<agency>_<value>`.
    pub scoped: bool,
}

impl IdPart {
    pub const fn labeled(label: &'static str, column: &'static str) -> Self {
        Self {
            label: Some(label),
            column,
            scoped: false,
        }
    }

    pub const fn plain(column: &'static str) -> Self {
        Self {
            label: None,
            column,
            scoped: false,
        }
    }

    pub const fn scoped(column: &'static str) -> Self {
        Self {
            label: None,
            column,
            scoped: true,
        }
    }
}

/// Ordered recipe for a deterministic identifier.
///
/// The output depends on nothing but the values handed in: no hashing, no
/// container iteration order, no clock.
#[derive(Debug, Clone, Copy)]
pub struct IdTemplate {
    pub separator: &'static str,
    pub parts: &'static [IdPart],
}

impl IdTemplate {
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parts.iter().map(|part| part.column)
    }

    /// `values` are in part order; a missing trailing value counts as absent.
    pub fn render<S: AsRef<str>>(&self, values: &[Option<S>]) -> String {
        let mut id = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                id.push_str(self.separator);
            }
            if let Some(label) = part.label {
                id.push_str(label);
                id.push('=');
            }
            let value = values
                .get(i)
                .and_then(|value| value.as_ref())
                .map(|value| value.as_ref())
                .unwrap_or(NULL_TOKEN);
            id.push_str(value);
        }
        id
    }

    /// Like [`IdTemplate::render`], applying the scope to the parts that ask for it.
    pub fn render_scoped<S: AsRef<str>>(&self, scope: &str, values: &[Option<S>]) -> String {
        let values: Vec<Option<String>> = self
            .parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                let value = values.get(i)?.as_ref()?.as_ref();
                Some(if part.scoped {
                    format!("{scope}_{value}")
                } else {
                    value.to_string()
                })
            })
            .collect();
        self.render(&values)
    }
}
