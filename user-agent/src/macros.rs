/// Logs a structured line with timestamp, level, component, pid, tid, and message.
/// Usage:
/// ```rust
/// use log::Level;
/// agent::agent_log!(Level::Info, "host", "node {} published", "/dev/driver_demo");
/// ```
/// Logs like:
/// [2025-04-25T16:32:10+02:00][INFO][host][pid=4568][tid=ThreadId(1)] node /dev/driver_demo published
#[macro_export]
macro_rules! agent_log {
    ($level:expr, $component:expr, $fmt:expr $(, $($arg:tt)+)?) => {
        log::log!(
            $level,
            concat!(
                "[", "{}", "]",          // timestamp
                "[", "{}", "]",          // level via Display
                "[", $component, "]",    // component
                "[pid=", "{}", "]",      // pid
                "[tid=", "{:?}", "] ",   // tid
                $fmt                     // your message
            ),
            chrono::Local::now().to_rfc3339(),
            $level,
            std::process::id(),
            std::thread::current().id()
            $(, $($arg)+)?
        );
    };
}
