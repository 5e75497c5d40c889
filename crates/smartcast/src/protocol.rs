//! Wire-level constants and payload types for the SmartCast API.
//!
//! Responses share one envelope shape regardless of endpoint:
//!
//! ```json
//! {"STATUS": {"RESULT": "SUCCESS", "DETAIL": "Success"},
//!  "ITEMS": [{"NAME": "volume", "VALUE": 23, "HASHVAL": 1234}]}
//! ```

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::types::DeviceClass;
use crate::types::RemoteKey;

pub const POWER_MODE_PATH: &str = "/state/device/power_mode";
pub const KEY_COMMAND_PATH: &str = "/key_command/";
pub const APP_LAUNCH_PATH: &str = "/app/launch";

/// Root of the dynamic settings tree. This is what differs between the two
/// device classes: TVs nest everything under tv_settings, speakers and
/// soundbars expose audio_settings directly.
pub fn settings_root(class: DeviceClass) -> &'static str {
    match class {
        DeviceClass::Tv => "/menu_native/dynamic/tv_settings",
        DeviceClass::Speaker => "/menu_native/dynamic/audio_settings",
    }
}

pub fn audio_root_path(class: DeviceClass) -> String {
    match class {
        DeviceClass::Tv => format!("{}/audio", settings_root(class)),
        // the speaker settings root *is* the audio tree
        DeviceClass::Speaker => settings_root(class).to_string(),
    }
}

pub fn audio_setting_path(class: DeviceClass, name: &str) -> String {
    format!("{}/{}", audio_root_path(class), name)
}

pub fn current_input_path(class: DeviceClass) -> String {
    format!("{}/devices/current_input", settings_root(class))
}

pub fn input_list_path(class: DeviceClass) -> String {
    format!("{}/devices/name_input", settings_root(class))
}

/// A (codeset, code) pair for the key-command endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCode {
    pub codeset: u8,
    pub code: u8,
}

pub const KEY_POW_OFF: KeyCode = KeyCode { codeset: 11, code: 0 };
pub const KEY_POW_ON: KeyCode = KeyCode { codeset: 11, code: 1 };
pub const KEY_VOL_DOWN: KeyCode = KeyCode { codeset: 5, code: 0 };
pub const KEY_VOL_UP: KeyCode = KeyCode { codeset: 5, code: 1 };
pub const KEY_MUTE_OFF: KeyCode = KeyCode { codeset: 5, code: 2 };
pub const KEY_MUTE_ON: KeyCode = KeyCode { codeset: 5, code: 3 };

/// D-pad codes. Both device classes share the keypress codesets.
pub fn key_code(key: RemoteKey) -> KeyCode {
    let (codeset, code) = match key {
        RemoteKey::Down => (3, 0),
        RemoteKey::Left => (3, 1),
        RemoteKey::Ok => (3, 2),
        RemoteKey::Right => (3, 7),
        RemoteKey::Up => (3, 8),
    };
    KeyCode { codeset, code }
}

/// STATUS block of the response envelope
#[derive(Debug, Deserialize)]
pub struct Status {
    #[serde(rename = "RESULT")]
    pub result: String,
    #[serde(rename = "DETAIL", default)]
    pub detail: String,
}

impl Status {
    pub fn is_success(&self) -> bool {
        self.result.eq_ignore_ascii_case("success")
    }

    pub fn is_uri_not_found(&self) -> bool {
        self.result.eq_ignore_ascii_case("uri_not_found")
    }
}

/// One entry of the ITEMS list. Dynamic settings carry a HASHVAL that must
/// be echoed back in MODIFY requests; slider settings may carry a MAXIMUM.
#[derive(Debug, Deserialize)]
pub struct Item {
    #[serde(rename = "NAME", default)]
    pub name: String,
    #[serde(rename = "VALUE", default)]
    pub value: Option<Value>,
    #[serde(rename = "HASHVAL", default)]
    pub hashval: Option<i64>,
    #[serde(rename = "MAXIMUM", default)]
    pub maximum: Option<i64>,
}

/// Common response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "STATUS")]
    pub status: Status,
    #[serde(rename = "ITEMS", default)]
    pub items: Vec<Item>,
}

impl Envelope {
    /// First item of the response, where most single-value reads live
    pub fn first_item(&self) -> Option<&Item> {
        self.items.first()
    }
}

#[derive(Debug, Serialize)]
struct KeyPress {
    #[serde(rename = "CODESET")]
    codeset: u8,
    #[serde(rename = "CODE")]
    code: u8,
    #[serde(rename = "ACTION")]
    action: &'static str,
}

/// Body for the key-command endpoint; `repeat` presses in one request
#[derive(Debug, Serialize)]
pub struct KeyCommand {
    #[serde(rename = "KEYLIST")]
    keylist: Vec<KeyPress>,
}

impl KeyCommand {
    pub fn new(key: KeyCode, repeat: u32) -> Self {
        Self {
            keylist: (0..repeat)
                .map(|_| KeyPress {
                    codeset: key.codeset,
                    code: key.code,
                    action: "KEYPRESS",
                })
                .collect(),
        }
    }
}

/// Body for MODIFY writes against a dynamic setting
#[derive(Debug, Serialize)]
pub struct Modify {
    #[serde(rename = "REQUEST")]
    request: &'static str,
    #[serde(rename = "HASHVAL")]
    hashval: i64,
    #[serde(rename = "VALUE")]
    value: Value,
}

impl Modify {
    pub fn new(hashval: i64, value: impl Into<Value>) -> Self {
        Self {
            request: "MODIFY",
            hashval,
            value: value.into(),
        }
    }
}

/// A launchable app known to the bundled registry
#[derive(Debug, Clone, Copy)]
pub struct AppDef {
    pub name: &'static str,
    pub name_space: u8,
    pub app_id: &'static str,
}

/// Well-known SmartCast apps. The device itself has no queryable catalogue;
/// the published catalogue maps names to (NAME_SPACE, APP_ID) pairs.
pub const APPS: &[AppDef] = &[
    AppDef { name: "SmartCast Home", name_space: 4, app_id: "1" },
    AppDef { name: "Netflix", name_space: 3, app_id: "1" },
    AppDef { name: "Prime Video", name_space: 3, app_id: "3" },
    AppDef { name: "Hulu", name_space: 2, app_id: "3" },
    AppDef { name: "YouTube", name_space: 5, app_id: "1" },
    AppDef { name: "YouTube TV", name_space: 5, app_id: "3" },
    AppDef { name: "Vudu", name_space: 2, app_id: "21" },
    AppDef { name: "Plex", name_space: 2, app_id: "9" },
    AppDef { name: "Pandora", name_space: 2, app_id: "2" },
    AppDef { name: "iHeartRadio", name_space: 2, app_id: "6" },
];

pub fn find_app(name: &str) -> Option<&'static AppDef> {
    APPS.iter().find(|app| app.name.eq_ignore_ascii_case(name))
}

/// Body for the app-launch endpoint
#[derive(Debug, Serialize)]
pub struct AppLaunch {
    #[serde(rename = "VALUE")]
    value: AppLaunchValue,
}

#[derive(Debug, Serialize)]
struct AppLaunchValue {
    #[serde(rename = "NAME_SPACE")]
    name_space: u8,
    #[serde(rename = "APP_ID")]
    app_id: &'static str,
    #[serde(rename = "MESSAGE")]
    message: Option<String>,
}

impl AppLaunch {
    pub fn new(app: &AppDef) -> Self {
        Self {
            value: AppLaunchValue {
                name_space: app.name_space,
                app_id: app.app_id,
                message: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_roots_differ_by_class() {
        assert_eq!(
            audio_setting_path(DeviceClass::Tv, "volume"),
            "/menu_native/dynamic/tv_settings/audio/volume"
        );
        assert_eq!(
            audio_setting_path(DeviceClass::Speaker, "volume"),
            "/menu_native/dynamic/audio_settings/volume"
        );
    }

    #[test]
    fn test_dpad_key_codes() {
        assert_eq!(key_code(RemoteKey::Down), KeyCode { codeset: 3, code: 0 });
        assert_eq!(key_code(RemoteKey::Left), KeyCode { codeset: 3, code: 1 });
        assert_eq!(key_code(RemoteKey::Ok), KeyCode { codeset: 3, code: 2 });
        assert_eq!(key_code(RemoteKey::Right), KeyCode { codeset: 3, code: 7 });
        assert_eq!(key_code(RemoteKey::Up), KeyCode { codeset: 3, code: 8 });
    }

    #[test]
    fn test_key_command_repeats() {
        let body = serde_json::to_value(KeyCommand::new(KEY_VOL_UP, 3)).unwrap();
        let keylist = body["KEYLIST"].as_array().unwrap();
        assert_eq!(keylist.len(), 3);
        assert_eq!(keylist[0]["CODESET"], 5);
        assert_eq!(keylist[0]["CODE"], 1);
        assert_eq!(keylist[0]["ACTION"], "KEYPRESS");
    }

    #[test]
    fn test_envelope_parse_success() {
        let raw = r#"{"STATUS": {"RESULT": "SUCCESS", "DETAIL": "Success"},
                      "ITEMS": [{"NAME": "volume", "VALUE": 23, "HASHVAL": 891, "MAXIMUM": 100}]}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.status.is_success());
        let item = envelope.first_item().unwrap();
        assert_eq!(item.value.as_ref().unwrap().as_i64(), Some(23));
        assert_eq!(item.hashval, Some(891));
        assert_eq!(item.maximum, Some(100));
    }

    #[test]
    fn test_envelope_parse_uri_not_found() {
        let raw = r#"{"STATUS": {"RESULT": "uri_not_found", "DETAIL": "URI not found"}}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert!(!envelope.status.is_success());
        assert!(envelope.status.is_uri_not_found());
        assert!(envelope.first_item().is_none());
    }

    #[test]
    fn test_envelope_parse_absent_value() {
        let raw = r#"{"STATUS": {"RESULT": "SUCCESS", "DETAIL": ""},
                      "ITEMS": [{"NAME": "mute", "VALUE": null}]}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.first_item().unwrap().value.is_none());
    }

    #[test]
    fn test_modify_body() {
        let body = serde_json::to_value(Modify::new(42, 17)).unwrap();
        assert_eq!(body["REQUEST"], "MODIFY");
        assert_eq!(body["HASHVAL"], 42);
        assert_eq!(body["VALUE"], 17);
    }

    #[test]
    fn test_app_registry_lookup() {
        assert!(find_app("Netflix").is_some());
        assert!(find_app("netflix").is_some());
        assert!(find_app("Definitely Not An App").is_none());
    }

    #[test]
    fn test_app_launch_body() {
        let app = find_app("SmartCast Home").unwrap();
        let body = serde_json::to_value(AppLaunch::new(app)).unwrap();
        assert_eq!(body["VALUE"]["NAME_SPACE"], 4);
        assert_eq!(body["VALUE"]["APP_ID"], "1");
        assert!(body["VALUE"]["MESSAGE"].is_null());
    }
}
