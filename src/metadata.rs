include!(concat!(env!("OUT_DIR"), "/pkg_info.rs"));

/// One-line banner used by `version` and the chat greeting.
pub fn banner() -> String {
    format!("{PKG_NAME} {PKG_VERSION} ({PKG_LICENSE})")
}
