//! Modifier flags on declarations and members.
//!
//! Serialized as a list of keywords (`["export", "declare"]`) so manifests
//! written by a front-end stay readable.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[derive(Serialize, Deserialize)]
    #[serde(try_from = "Vec<String>", into = "Vec<String>")]
    pub struct Modifiers: u16 {
        const EXPORT = 1 << 0;
        const DEFAULT = 1 << 1;
        const DECLARE = 1 << 2;
        const CONST = 1 << 3;
        const ABSTRACT = 1 << 4;
        const READONLY = 1 << 5;
        const STATIC = 1 << 6;
        const PUBLIC = 1 << 7;
        const PRIVATE = 1 << 8;
        const PROTECTED = 1 << 9;
        const OVERRIDE = 1 << 10;
        const ACCESSOR = 1 << 11;
    }
}

/// Keyword order used when printing, matching the order TypeScript emits.
const KEYWORDS: &[(Modifiers, &str)] = &[
    (Modifiers::EXPORT, "export"),
    (Modifiers::DEFAULT, "default"),
    (Modifiers::DECLARE, "declare"),
    (Modifiers::PUBLIC, "public"),
    (Modifiers::PRIVATE, "private"),
    (Modifiers::PROTECTED, "protected"),
    (Modifiers::STATIC, "static"),
    (Modifiers::OVERRIDE, "override"),
    (Modifiers::ABSTRACT, "abstract"),
    (Modifiers::ACCESSOR, "accessor"),
    (Modifiers::READONLY, "readonly"),
    (Modifiers::CONST, "const"),
];

impl Modifiers {
    /// Keywords for the set flags, in emit order.
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        KEYWORDS
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, kw)| *kw)
    }

    pub fn from_keyword(keyword: &str) -> Option<Modifiers> {
        KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == keyword)
            .map(|(flag, _)| *flag)
    }
}

impl TryFrom<Vec<String>> for Modifiers {
    type Error = String;

    fn try_from(keywords: Vec<String>) -> Result<Self, Self::Error> {
        keywords.iter().try_fold(Modifiers::empty(), |acc, kw| {
            Modifiers::from_keyword(kw)
                .map(|flag| acc | flag)
                .ok_or_else(|| format!("unknown modifier '{kw}'"))
        })
    }
}

impl From<Modifiers> for Vec<String> {
    fn from(modifiers: Modifiers) -> Self {
        modifiers.keywords().map(str::to_string).collect()
    }
}
