//! Convenience macros for script development.

/// Builds an [`ErrorRecord`](flowhook_entity::ErrorRecord). The source
/// defaults to `"script"`.
///
/// # Example
/// ```rust,ignore
/// let error = error_record!("MISSING_EMAIL", "record has no email");
/// let error = error_record!("MISSING_EMAIL", "record has no email", "preMap");
/// ```
#[macro_export]
macro_rules! error_record {
    ($code:expr, $message:expr) => {
        $crate::prelude::ErrorRecord::new($code, $message, "script")
    };
    ($code:expr, $message:expr, $source:expr) => {
        $crate::prelude::ErrorRecord::new($code, $message, $source)
    };
}

/// Builds a [`Settings`](flowhook_entity::Settings) map.
///
/// # Example
/// ```rust,ignore
/// let settings = settings!({
///     "region" => json!("eu"),
///     "dryRun" => json!(true),
/// });
/// ```
#[macro_export]
macro_rules! settings {
    () => {
        $crate::prelude::Settings::new()
    };
    ({ $($key:expr => $value:expr),* $(,)? }) => {{
        let mut settings = $crate::prelude::Settings::new();
        $(
            settings.insert($key, $value);
        )*
        settings
    }};
}
