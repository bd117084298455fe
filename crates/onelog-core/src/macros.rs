//! Logging macros

/// Invoke `$callback!` with every built-in method as `fn_name => "methodName"`.
macro_rules! for_each_builtin_method {
    ($callback:ident) => {
        $callback! {
            debug => "debug",
            info => "info",
            notice => "notice",
            warning => "warning",
            error => "error",
            crit => "crit",
            alert => "alert",
            emerg => "emerg",
            trace => "trace",
            log => "log",
            warn => "warn",
            line => "line",
            time => "time",
            time_end => "timeEnd",
            profile => "profile",
            assert => "assert",
            fatal => "fatal",
            dir => "dir",
            start => "start",
            stop => "stop",
            is_level_enabled => "isLevelEnabled",
        }
    };
}

/// Convenience macros for logging a formatted message
///
/// The message is passed as a single string argument. Each macro evaluates
/// to the `OnelogResult` of the call.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&[$crate::Value::from(format!($($arg)*))])
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&[$crate::Value::from(format!($($arg)*))])
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&[$crate::Value::from(format!($($arg)*))])
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&[$crate::Value::from(format!($($arg)*))])
    };
}

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)*) => {
        $logger.trace(&[$crate::Value::from(format!($($arg)*))])
    };
}
