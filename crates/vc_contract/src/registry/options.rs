use alloc::borrow::Cow;
use alloc::string::String;

// -----------------------------------------------------------------------------
// NamingPolicy

/// How member names become field keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NamingPolicy {
    /// Keys are member names as declared.
    #[default]
    Verbatim,
    /// `UserName` and `user_name` become `userName`.
    CamelCase,
    /// `UserName` and `userName` become `user_name`.
    SnakeCase,
}

impl NamingPolicy {
    pub fn apply(self, name: &'static str) -> Cow<'static, str> {
        match self {
            Self::Verbatim => Cow::Borrowed(name),
            Self::CamelCase => Cow::Owned(to_camel_case(name)),
            Self::SnakeCase => Cow::Owned(to_snake_case(name)),
        }
    }
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if out.is_empty() {
            out.extend(ch.to_lowercase());
        } else if upper_next {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper_next = false;
    }
    out
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

// -----------------------------------------------------------------------------
// UnknownKeys

/// What decoding does with a key no descriptor matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnknownKeys {
    /// Skip the value.
    #[default]
    Ignore,
    /// Fail the decode.
    Reject,
}

// -----------------------------------------------------------------------------
// ContractOptions

/// Registry-wide settings applied to every contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ContractOptions {
    pub naming: NamingPolicy,
    pub unknown_keys: UnknownKeys,
}

impl ContractOptions {
    #[inline]
    pub const fn new() -> Self {
        Self {
            naming: NamingPolicy::Verbatim,
            unknown_keys: UnknownKeys::Ignore,
        }
    }

    #[inline]
    pub const fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    #[inline]
    pub const fn with_unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }
}
