//! Plot labels for fitted parameters.

use crate::error::{FitError, Result};
use crate::utils::format::format_g;

/// Build one label per (symbol, peak) pair.
///
/// Symbols form the outer loop and peaks the inner loop. The value shown for
/// symbol `ii` of peak `jj` is taken at flattened index `ii + jj * npars`,
/// and both value and error are formatted like C's `%6.4g`:
///
/// ```
/// use specfit_rs::fitter::annotations::labels;
///
/// let labels = labels(&["A", "v"], 1, 2, &[1.0, 0.25], &[0.01, 0.002]).unwrap();
/// assert_eq!(labels[0], "$A(0)$=     1 $\\pm$   0.01");
/// assert_eq!(labels[1], "$v(0)$=  0.25 $\\pm$  0.002");
/// ```
///
/// # Errors
///
/// * `FitError::State` if an index falls outside `params` or `perror`
pub fn labels<S: AsRef<str>>(
    symbols: &[S],
    npeaks: usize,
    npars: usize,
    params: &[f64],
    perror: &[f64],
) -> Result<Vec<String>> {
    let mut labels = Vec::with_capacity(symbols.len() * npeaks);

    for (ii, symbol) in symbols.iter().enumerate() {
        for jj in 0..npeaks {
            let index = ii + jj * npars;
            let (value, error) = match (params.get(index), perror.get(index)) {
                (Some(&value), Some(&error)) => (value, error),
                _ => {
                    return Err(FitError::State(format!(
                        "no fitted value for symbol {} of peak {} (index {}, {} parameters fitted)",
                        symbol.as_ref(),
                        jj,
                        index,
                        params.len()
                    )))
                }
            };
            labels.push(format!(
                "${}({})$={} $\\pm$ {}",
                symbol.as_ref(),
                jj,
                format_g(value, 6, 4),
                format_g(error, 6, 4)
            ));
        }
    }

    Ok(labels)
}
