//! Documents written on first start.

use serde_json::{json, Value};

const WALLPAPER_URL: &str = "https://w.wallhaven.cc/full/x6/wallhaven-x6mjlo.png";

const COMPUTER_ICON: &str =
    "https://img.icons8.com/?size=100&id=iCwcOoy8tOGw&format=png&color=000000";
const SETTINGS_ICON: &str =
    "https://img.icons8.com/?size=100&id=PUULuXvUfB6u&format=png&color=000000";
const NOTES_ICON: &str =
    "https://img.icons8.com/?size=100&id=JWpT8cAn8G0V&format=png&color=000000";

pub fn default_settings() -> Value {
    json!({
        "backgroundImage": WALLPAPER_URL,
        "preferences": {
            "theme": "dark",
            "fontSize": 14,
            "language": "en-US"
        }
    })
}

fn builtin_shortcuts() -> Value {
    json!([
        {
            "title": "My Computer",
            "contentPath": "/apps/computer/index.html",
            "iconUrl": COMPUTER_ICON
        },
        {
            "title": "Settings",
            "contentPath": "/apps/settings/index.html",
            "iconUrl": SETTINGS_ICON
        },
        {
            "title": "My Notes",
            "contentPath": "/apps/notes/index.html",
            "iconUrl": NOTES_ICON
        }
    ])
}

pub fn default_shortcuts() -> Value {
    json!({
        "desktop": builtin_shortcuts(),
        "taskbar": [],
        "startMenu": builtin_shortcuts()
    })
}
