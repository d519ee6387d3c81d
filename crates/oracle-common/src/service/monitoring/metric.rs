#[macro_export]
macro_rules! measure_duration {
    ($e: expr) => {{
        let now = std::time::Instant::now();

        let result = $e;
        (result, now.elapsed())
    }};
}

#[macro_export]
macro_rules! metric {
    (counter [ $label: ident ] = $i: expr $(,$field: ident = $value: expr)*) => {
        tracing::debug!(monotonic_counter.$label = $i, $($field = $value),*)
    };
    (on error $e: expr => counter [ $label: ident ] = $i: expr $(,$field: ident = $value: expr)*) => {
        if let Err(ref e) = $e {
            tracing::debug!(counter.$label = $i, $($field = $value,)* error = e.to_string());
        }
    };
    (gauge [ $label: ident ] = $i: expr $(,$field: ident = $value: expr)*) => {
        tracing::debug!(gauge.$label = $i, $($field = $value),*)
    };
    (histogram [ $label: ident ] = $i: expr $(,$field: ident = $value: expr)*) => {
        tracing::debug!(histogram.$label = $i as f64, $($field = $value),*)
    };
}
