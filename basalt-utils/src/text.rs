//! Chat text components in the protocol-5 JSON format.

use serde::{Deserialize, Serialize};

/// A named chat color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatColor {
    /// `§0`
    Black,
    /// `§1`
    DarkBlue,
    /// `§2`
    DarkGreen,
    /// `§3`
    DarkAqua,
    /// `§4`
    DarkRed,
    /// `§5`
    DarkPurple,
    /// `§6`
    Gold,
    /// `§7`
    Gray,
    /// `§8`
    DarkGray,
    /// `§9`
    Blue,
    /// `§a`
    Green,
    /// `§b`
    Aqua,
    /// `§c`
    Red,
    /// `§d`
    LightPurple,
    /// `§e`
    Yellow,
    /// `§f`
    White,
}

/// A chat component: literal text or a translation key with arguments,
/// optional formatting, and child components appended under `extra`.
///
/// Serialization produces the canonical form the wire expects: absent
/// fields are omitted rather than serialized as `null`/`false`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatComponent {
    /// Literal text content.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Translation key, used instead of `text` for localized messages
    /// (death messages, kick reasons).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<String>,
    /// Arguments substituted into the translation key.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub with: Vec<ChatComponent>,
    /// Text color; inherited from the parent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ChatColor>,
    /// Bold flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    /// Italic flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    /// Underline flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlined: Option<bool>,
    /// Strikethrough flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    /// Obfuscated ("magic") flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfuscated: Option<bool>,
    /// Sibling components rendered after this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<ChatComponent>,
}

impl ChatComponent {
    /// A plain text component.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A translation component with arguments.
    #[must_use]
    pub fn translate(key: impl Into<String>, with: Vec<ChatComponent>) -> Self {
        Self {
            translate: Some(key.into()),
            with,
            ..Self::default()
        }
    }

    /// Sets the color, builder style.
    #[must_use]
    pub fn colored(mut self, color: ChatColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the bold flag, builder style.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    /// Appends a sibling component.
    #[must_use]
    pub fn append(mut self, child: ChatComponent) -> Self {
        self.extra.push(child);
        self
    }

    /// Serializes to the wire JSON string.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"text\":\"\"}"))
    }

    /// Parses a component from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Flattens the component tree into unformatted text.
    #[must_use]
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        self.collect_plain(&mut out);
        out
    }

    fn collect_plain(&self, out: &mut String) {
        if let Some(key) = &self.translate {
            out.push_str(key);
            if !self.with.is_empty() {
                out.push('[');
                for (i, arg) in self.with.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.collect_plain(out);
                }
                out.push(']');
            }
        } else {
            out.push_str(&self.text);
        }
        for child in &self.extra {
            child.collect_plain(out);
        }
    }
}

impl std::fmt::Display for ChatComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_plain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_component_json() {
        let c = ChatComponent::text("Hello");
        assert_eq!(c.to_json(), r#"{"text":"Hello"}"#);
    }

    #[test]
    fn formatting_and_color() {
        let c = ChatComponent::text("warn").colored(ChatColor::Gold).bold();
        assert_eq!(c.to_json(), r#"{"text":"warn","color":"gold","bold":true}"#);
    }

    #[test]
    fn escapes_control_characters() {
        let c = ChatComponent::text("a\"b\\c\nd");
        let json = c.to_json();
        assert!(json.contains(r#"a\"b\\c\nd"#));
        assert_eq!(ChatComponent::from_json(&json).unwrap(), c);
    }

    #[test]
    fn json_round_trip_is_identity_on_canonical_forms() {
        let c = ChatComponent::text("root")
            .colored(ChatColor::Red)
            .append(ChatComponent::text("child").bold())
            .append(ChatComponent::translate(
                "death.attack.fall",
                vec![ChatComponent::text("Alice")],
            ));
        let json = c.to_json();
        let parsed = ChatComponent::from_json(&json).unwrap();
        assert_eq!(parsed, c);
        assert_eq!(parsed.to_json(), json);
    }

    #[test]
    fn plain_text_flattening() {
        let c = ChatComponent::text("a").append(ChatComponent::text("b"));
        assert_eq!(c.to_plain(), "ab");
    }
}
