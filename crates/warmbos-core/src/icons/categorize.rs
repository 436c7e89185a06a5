//! Filename-based icon categorization and display names.

/// Category assigned when no keyword matches.
pub const MISC_CATEGORY: &str = "misc";

/// Ordered (category, keywords) table. The first category with a keyword
/// contained in the lowercased filename wins, so order is significant.
pub const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    ("applications", &["app", "application", "software", "program"]),
    ("system", &["system", "settings", "config", "admin", "gear", "wrench"]),
    ("network", &["network", "wifi", "internet", "web", "cloud", "server"]),
    ("media", &["media", "music", "video", "audio", "play", "sound"]),
    ("files", &["file", "folder", "document", "doc", "pdf", "text"]),
    ("communication", &["mail", "email", "chat", "message", "phone", "call"]),
    ("games", &["game", "gaming", "controller", "play"]),
    ("graphics", &["image", "photo", "picture", "graphics", "design"]),
    ("office", &["office", "word", "excel", "powerpoint", "calc", "writer"]),
    ("development", &["code", "dev", "programming", "terminal", "git"]),
    ("security", &["security", "lock", "key", "shield", "firewall"]),
    ("utilities", &["utility", "tool", "calculator", "archive", "zip"]),
];

/// Categorize an icon by its filename (usually the stem).
pub fn categorize(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    CATEGORY_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(MISC_CATEGORY)
}

/// Human-readable name for an icon stem.
///
/// `-` and `_` become spaces, then each cased letter that follows an uncased
/// character is upper-cased and every other cased letter lower-cased.
/// Uncased characters (digits, CJK, punctuation) start a new word.
pub fn display_name(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut prev_is_cased = false;

    for ch in stem.chars() {
        let ch = if ch == '-' || ch == '_' { ' ' } else { ch };
        let cased = ch.is_lowercase() || ch.is_uppercase();
        if cased {
            if prev_is_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
        } else {
            out.push(ch);
        }
        prev_is_cased = cased;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_in_table_order() {
        // "settings" (system) is scanned before "wifi" (network)
        assert_eq!(categorize("wifi-settings"), "system");
        // "play" appears under media and games; media comes first
        assert_eq!(categorize("playstation"), "media");
        // "app" is a substring of "whatsapp", applications wins over chat
        assert_eq!(categorize("whatsapp-chat"), "applications");
    }

    #[test]
    fn test_each_category_reachable() {
        assert_eq!(categorize("software-center"), "applications");
        assert_eq!(categorize("gear"), "system");
        assert_eq!(categorize("nextcloud"), "network");
        assert_eq!(categorize("jellyfin-audio"), "media");
        assert_eq!(categorize("paperless-pdf"), "files");
        assert_eq!(categorize("thunderbird-mail"), "communication");
        assert_eq!(categorize("gaming-rig"), "games");
        assert_eq!(categorize("photoprism"), "graphics");
        assert_eq!(categorize("libreoffice"), "office");
        assert_eq!(categorize("gitea"), "development");
        assert_eq!(categorize("bitwarden-shield"), "security");
        assert_eq!(categorize("7zip"), "utilities");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(categorize("TERMINAL"), "development");
        assert_eq!(categorize("Mail"), "communication");
    }

    #[test]
    fn test_misc_fallback() {
        assert_eq!(categorize("jellyfin"), MISC_CATEGORY);
        assert_eq!(categorize(""), MISC_CATEGORY);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("my-icon_name"), "My Icon Name");
        assert_eq!(display_name("home-assistant"), "Home Assistant");
        assert_eq!(display_name("iOS"), "Ios");
        assert_eq!(display_name("2fauth"), "2Fauth");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_display_name_uncased_letters_start_words() {
        // CJK letters are alphabetic but have no case
        assert_eq!(display_name("中a"), "中A");
        assert_eq!(display_name("qq音乐music"), "Qq音乐Music");
        assert_eq!(display_name("ÉCOLE-été"), "École Été");
    }
}
