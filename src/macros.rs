/// returns name of current function.
macro_rules! fn_name_bare {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        type_name_of(f)
            .rsplit("::")
            .find(|&part| part != "f" && part != "{{closure}}")
            .unwrap_or("<unknown>")
    }};
}

/// returns name of current function plus "()"
macro_rules! fn_name {
    () => {{
        format!("{}()", crate::macros::fn_name_bare!())
    }};
}

/// logs a debug event if scope duration exceeds a threshold.
/// See [crate::ScopeDurationLogger]
macro_rules! log_slow_scope {
    () => {
        let log_slow_scope_desc = $crate::macros::fn_name!();
        let _____x = $crate::ScopeDurationLogger::new_default_threshold(&log_slow_scope_desc);
    };
    ($description: expr) => {
        let log_slow_scope_desc = $description;
        let _____x = $crate::ScopeDurationLogger::new_default_threshold(&log_slow_scope_desc);
    };
    ($description: expr, $threshold: expr) => {
        let log_slow_scope_desc = $description;
        let _____x =
            $crate::ScopeDurationLogger::new_with_threshold(&log_slow_scope_desc, $threshold);
    };
}

// These allow the macros to be used as
// use crate::macros::xxxxx;
pub(crate) use fn_name;
pub(crate) use fn_name_bare;
pub(crate) use log_slow_scope;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod tests {
    use tracing_test::traced_test;

    #[test]
    fn fn_name_names_enclosing_fn() {
        assert_eq!("fn_name_names_enclosing_fn", fn_name_bare!());
        assert_eq!("fn_name_names_enclosing_fn()", fn_name!());
    }

    #[traced_test]
    #[test]
    fn log_slow_scope_reports_scope_over_threshold() {
        {
            log_slow_scope!(fn_name!(), 0.0);
        }

        assert!(logs_contain(
            "executed log_slow_scope_reports_scope_over_threshold()"
        ));
    }
}
