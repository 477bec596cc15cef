use crate::runtime::error::RuntimeError;
use miette::Report;

pub fn report_runtime_error(error: RuntimeError) {
    eprintln!("{:?}", Report::new(error));
}
