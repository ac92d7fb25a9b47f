//! One-off evaluation of expression scripts.

use crate::error::JiffleError;
use crate::script::Jiffle;
use jiffle_runtime::EvaluationModel;

/// Compile `script` without images and return its value at pixel (0, 0).
///
/// The value is that of the last expression or assignment the script
/// executed, or NaN if it executed none.
///
/// ```
/// assert_eq!(jiffle::eval_script("1 + 2*3^2 / 3;").unwrap(), 7.0);
/// ```
pub fn eval_script(script: &str) -> Result<f64, JiffleError> {
    let mut jiffle = Jiffle::named("eval");
    jiffle.set_script(script);
    jiffle.compile()?;
    let mut unit = jiffle.runtime_unit(EvaluationModel::Direct)?;
    Ok(unit.evaluate(0, 0)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_script() {
        assert_eq!(eval_script("0.5^3;").unwrap(), 0.125);
        assert_eq!(eval_script("n = 2; n * M_PI;").unwrap(), 2.0 * std::f64::consts::PI);
        assert!(eval_script(";").unwrap().is_nan());
    }

    #[test]
    fn test_eval_script_reports_compile_errors() {
        assert!(matches!(
            eval_script("nosuch(1);"),
            Err(JiffleError::Compile(_))
        ));
    }
}
