//! Browser client, compiled into the binary.

#[derive(Debug, Clone, Copy)]
pub struct StaticAsset {
    pub content_type: &'static str,
    pub body: &'static str,
}

macro_rules! asset {
    ($file:literal, $content_type:literal) => {
        StaticAsset {
            content_type: $content_type,
            body: include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/src/web/assets/",
                $file
            )),
        }
    };
}

pub const INDEX: StaticAsset = asset!("index.html", "text/html; charset=utf-8");
const STYLES: StaticAsset = asset!("styles.css", "text/css; charset=utf-8");
const SCRIPT: StaticAsset = asset!("app.js", "application/javascript; charset=utf-8");

pub fn lookup(name: &str) -> Option<StaticAsset> {
    match name {
        "styles.css" => Some(STYLES),
        "app.js" => Some(SCRIPT),
        _ => None,
    }
}
