// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros for convenient call-site capture

/// Capture the current source location (file, line, enclosing function).
///
/// Used by the `log_*!` macros; also useful when calling
/// [`Logger::log`](crate::Logger::log) directly.
#[macro_export]
macro_rules! source_loc {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        $crate::SourceLocation {
            file: file!(),
            line: line!(),
            function: name.strip_suffix("::f").unwrap_or(name),
        }
    }};
}

/// Log a message with trace level
///
/// # Examples
/// ```ignore
/// log_trace!("polling ring {}", id);
/// ```
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        if let Ok(logger) = $crate::get_instance() {
            if logger.level_enabled($crate::Level::Trace) {
                logger.log($crate::source_loc!(), $crate::Level::Trace, ::std::format!($($arg)*));
            }
        }
    };
}

/// Log a message with debug level
///
/// # Examples
/// ```ignore
/// log_debug!("parsed {} bytes", n);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if let Ok(logger) = $crate::get_instance() {
            if logger.level_enabled($crate::Level::Debug) {
                logger.log($crate::source_loc!(), $crate::Level::Debug, ::std::format!($($arg)*));
            }
        }
    };
}

/// Log a message with info level
///
/// # Examples
/// ```ignore
/// log_info!("listener ready");
/// ```
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if let Ok(logger) = $crate::get_instance() {
            if logger.level_enabled($crate::Level::Info) {
                logger.log($crate::source_loc!(), $crate::Level::Info, ::std::format!($($arg)*));
            }
        }
    };
}

/// Log a message with warning level
///
/// # Examples
/// ```ignore
/// log_warning!("buffer at {}%", pct);
/// ```
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        if let Ok(logger) = $crate::get_instance() {
            if logger.level_enabled($crate::Level::Warning) {
                logger.log($crate::source_loc!(), $crate::Level::Warning, ::std::format!($($arg)*));
            }
        }
    };
}

/// Log a message with error level
///
/// # Examples
/// ```ignore
/// log_error!("bind failed: {}", err);
/// ```
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if let Ok(logger) = $crate::get_instance() {
            if logger.level_enabled($crate::Level::Error) {
                logger.log($crate::source_loc!(), $crate::Level::Error, ::std::format!($($arg)*));
            }
        }
    };
}

/// Log a message with fatal level
///
/// # Examples
/// ```ignore
/// log_fatal!("out of descriptors");
/// ```
#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)*) => {
        if let Ok(logger) = $crate::get_instance() {
            if logger.level_enabled($crate::Level::Fatal) {
                logger.log($crate::source_loc!(), $crate::Level::Fatal, ::std::format!($($arg)*));
            }
        }
    };
}

/// Log a milestone line at step level. The step number is prepended to the
/// message; the level token stays `STEP`.
///
/// # Examples
/// ```ignore
/// log_step!(3, "schema migrated");
/// // -> [STEP] Step 3: schema migrated
/// ```
#[macro_export]
macro_rules! log_step {
    ($step:expr, $($arg:tt)*) => {
        if let Ok(logger) = $crate::get_instance() {
            if logger.level_enabled($crate::Level::Step) {
                logger.log(
                    $crate::source_loc!(),
                    $crate::Level::Step,
                    ::std::format!("Step {}: {}", $step, ::std::format!($($arg)*)),
                );
            }
        }
    };
}
