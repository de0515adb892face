//! Verbose post-fit report, emitted through the `log` facade.

use super::result::FitResult;

pub(crate) fn log_report(result: &FitResult, veryverbose: bool) {
    log::info!("Fit status: {}", result.status);
    log::info!("Fit error message: {}", result.errmsg);
    log::info!("Fit message: {}", result.status_message());

    for (i, (value, error)) in result.params.iter().zip(&result.perror).enumerate() {
        log::info!("{} {} +/- {}", result.parameter_name(i), value, error);
    }

    log::info!(
        "Chi2: {} Reduced Chi2: {} DOF: {}",
        result.chi2,
        result.reduced_chi2(),
        result.dof()
    );

    if veryverbose {
        log::info!(
            "Iterations: {}  Function evaluations: {}",
            result.niter,
            result.nfev
        );
        if let Some(correl) = result.correlation() {
            log::info!("Correlation matrix:\n{:.3}", correl);
        }
    }
}
