// Error handling macros
// Capture raise sites and build taxonomy errors at the point of failure

/// Path of the enclosing function, e.g. `orders::service::OrderService::submit`
#[macro_export]
macro_rules! function_path {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let path = __type_name_of(__here);
        path.strip_suffix("::__here").unwrap_or(path)
    }};
}

/// Capture a [`RaiseSite`](crate::RaiseSite) including the enclosing function path
#[macro_export]
macro_rules! raise_site {
    () => {
        $crate::RaiseSite::new($crate::function_path!(), file!(), line!(), column!())
    };
}

/// Create a business error raised at the current function
#[macro_export]
macro_rules! business_error {
    ($key:expr, $message:expr) => {
        $crate::LocalizableError::business($key, $message).at($crate::raise_site!())
    };
    ($key:expr, $message:expr, $cause:expr) => {
        $crate::LocalizableError::business_caused_by($key, $cause, $message)
            .at($crate::raise_site!())
    };
}

/// Create a technical error raised at the current function
#[macro_export]
macro_rules! technical_error {
    ($message:expr) => {
        $crate::LocalizableError::technical($message).at($crate::raise_site!())
    };
    ($message:expr, $cause:expr) => {
        $crate::LocalizableError::technical_caused_by($cause, $message).at($crate::raise_site!())
    };
}

/// Return early with a business error
#[macro_export]
macro_rules! bail_business {
    ($key:expr, $message:expr) => {
        return Err($crate::business_error!($key, $message).into());
    };
    ($key:expr, $message:expr, $cause:expr) => {
        return Err($crate::business_error!($key, $message, $cause).into());
    };
}

/// Return early with a technical error
#[macro_export]
macro_rules! bail_technical {
    ($message:expr) => {
        return Err($crate::technical_error!($message).into());
    };
    ($message:expr, $cause:expr) => {
        return Err($crate::technical_error!($message, $cause).into());
    };
}

/// Return early with a business error if a domain rule is violated
#[macro_export]
macro_rules! ensure_business {
    ($cond:expr, $key:expr, $message:expr) => {
        if !($cond) {
            $crate::bail_business!($key, $message);
        }
    };
}
