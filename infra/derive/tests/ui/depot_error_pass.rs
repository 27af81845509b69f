use depot_derive::depot_error;
use std::borrow::Cow;

#[depot_error]
pub enum DemoError {
    #[status(500)]
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[status(400)]
    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: DemoError = "boom".into();
    assert_eq!(err.status_code(), 400);
}
