//! Bounded Levenberg-Marquardt solver.
//!
//! The solver iterates over the free parameters only (those neither fixed nor
//! tied). Each trial point is expanded back to the full parameter vector and
//! tie expressions are re-evaluated before the residual function is called.
//! Trial steps are projected onto the active limits, and parameters pinned at
//! a bound whose descent direction points outward are held in place.

use std::cell::Cell;

use ndarray::{Array1, Array2};

use super::covariance::{
    covariance_from_jacobian, expand_covariance, standard_errors_from_covariance,
};
use super::{LeastSquaresSolver, ResidualFunction, SolverConfig, SolverOutput, SolverStatus};
use crate::error::Result;
use crate::parinfo::{Limits, ParameterRecord, Ties};
use crate::utils::finite_difference::jacobian;
use crate::utils::matrix_convert::{ndarray_to_nalgebra, ndarray_vec_to_nalgebra};

/// Levenberg-Marquardt with box constraints and tied parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenbergMarquardt;

impl LevenbergMarquardt {
    pub fn new() -> Self {
        Self
    }
}

/// The free-parameter view of one solve
struct Problem<'a> {
    residual: &'a dyn ResidualFunction,
    records: &'a [ParameterRecord],
    ties: Ties,
    free: Vec<usize>,
    base: Vec<f64>,
    nfev: Cell<usize>,
}

impl Problem<'_> {
    /// Full parameter vector for the free values `x`, ties applied.
    fn expand(&self, x: &[f64]) -> Result<Vec<f64>> {
        let mut full = self.base.clone();
        for (&i, &value) in self.free.iter().zip(x) {
            full[i] = value;
        }
        self.ties.apply(&mut full, self.records)?;
        Ok(full)
    }

    fn evaluate(&self, x: &[f64]) -> Result<Array1<f64>> {
        let full = self.expand(x)?;
        self.nfev.set(self.nfev.get() + 1);
        self.residual.residuals(&full)
    }
}

fn improper_input(errmsg: String, start: &[f64]) -> Result<SolverOutput> {
    Ok(SolverOutput::failure(
        SolverStatus::ImproperInput,
        errmsg,
        start.to_vec(),
    ))
}

/// Stop the solve at the free values `x` with a failure status.
fn abort(problem: &Problem<'_>, x: &[f64], failure: (SolverStatus, String), niter: usize) -> SolverOutput {
    let (status, errmsg) = failure;
    let params = problem.expand(x).unwrap_or_else(|_| problem.base.clone());
    let mut output = SolverOutput::failure(status, errmsg, params);
    output.niter = niter;
    output.nfev = problem.nfev.get();
    output
}

/// Forward-difference Jacobian of the free parameters.
///
/// A residual evaluation that fails at a perturbed point, or a Jacobian with
/// non-finite entries, ends the solve with the returned status and message.
fn free_jacobian<F>(
    eval: F,
    x: &[f64],
    r: &Array1<f64>,
    steps: &[f64],
    bounds: &[Limits],
    epsfcn: f64,
) -> std::result::Result<Array2<f64>, (SolverStatus, String)>
where
    F: Fn(&[f64]) -> Result<Array1<f64>>,
{
    match jacobian(eval, x, r, steps, bounds, epsfcn) {
        Ok(jac) if jac.iter().all(|v| v.is_finite()) => Ok(jac),
        Ok(_) => Err((
            SolverStatus::NonFinite,
            "Jacobian contains non-finite values".to_string(),
        )),
        Err(e) => Err((
            SolverStatus::ImproperInput,
            format!("Residual evaluation failed while computing the Jacobian: {}", e),
        )),
    }
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Parameters that cannot move: pinned at a bound with the descent direction
/// pointing out of the feasible region, or with no influence on the residuals.
fn pegged_parameters(x: &[f64], gradient: &Array1<f64>, jtj: &Array2<f64>, bounds: &[Limits]) -> Vec<bool> {
    x.iter()
        .zip(bounds)
        .enumerate()
        .map(|(j, (&value, limits))| {
            let descent = -gradient[j];
            let at_lower = limits.lower().map_or(false, |lower| value <= lower) && descent < 0.0;
            let at_upper = limits.upper().map_or(false, |upper| value >= upper) && descent > 0.0;
            at_lower || at_upper || jtj[[j, j]] == 0.0
        })
        .collect()
}

/// Largest cosine between the residual vector and a movable Jacobian column.
///
/// A NaN term makes the result NaN, which never passes the gtol test.
fn max_gradient_cosine(jtj: &Array2<f64>, gradient: &Array1<f64>, cost: f64, pegged: &[bool]) -> f64 {
    let rnorm = cost.sqrt();
    pegged
        .iter()
        .enumerate()
        .filter(|&(_, &p)| !p)
        .map(|(j, _)| gradient[j].abs() / (jtj[[j, j]].sqrt() * rnorm))
        .fold(0.0, |acc: f64, cosine| {
            if cosine.is_nan() || cosine > acc {
                cosine
            } else {
                acc
            }
        })
}

/// Solve `(J^T J + lambda * diag(J^T J)) delta = -J^T r` with pegged
/// parameters held at zero.
fn damped_step(jtj: &Array2<f64>, gradient: &Array1<f64>, lambda: f64, pegged: &[bool]) -> Option<Vec<f64>> {
    let n = gradient.len();
    let mut a = ndarray_to_nalgebra(jtj);
    let mut b = ndarray_vec_to_nalgebra(gradient);

    for j in 0..n {
        if pegged[j] {
            for k in 0..n {
                a[(j, k)] = 0.0;
                a[(k, j)] = 0.0;
            }
            a[(j, j)] = 1.0;
            b[j] = 0.0;
        } else {
            a[(j, j)] += lambda * jtj[[j, j]];
        }
    }

    let solution = a.cholesky()?.solve(&b);
    if solution.iter().all(|v| v.is_finite()) {
        Some(solution.iter().map(|v| -v).collect())
    } else {
        None
    }
}

impl LeastSquaresSolver for LevenbergMarquardt {
    fn solve(
        &self,
        residual: &dyn ResidualFunction,
        parinfo: &[ParameterRecord],
        config: &SolverConfig,
    ) -> Result<SolverOutput> {
        let start: Vec<f64> = parinfo.iter().map(|record| record.value).collect();

        for record in parinfo {
            let limits = record.bounds();
            if let Err(e) = limits.validate() {
                return improper_input(e.to_string(), &start);
            }
            if record.is_free() {
                if let Err(e) = limits.check(record.value) {
                    return improper_input(e.to_string(), &start);
                }
            }
        }

        let ties = match Ties::compile(parinfo) {
            Ok(ties) => ties,
            Err(e) => return improper_input(format!("Invalid tie expression: {}", e), &start),
        };

        let free: Vec<usize> = parinfo
            .iter()
            .filter(|record| record.is_free())
            .map(|record| record.n())
            .collect();
        if free.is_empty() {
            return improper_input("No free parameters".to_string(), &start);
        }

        let mut base = start.clone();
        if let Err(e) = ties.apply(&mut base, parinfo) {
            return improper_input(format!("Invalid tie expression: {}", e), &start);
        }

        let bounds: Vec<Limits> = free.iter().map(|&i| parinfo[i].bounds()).collect();
        let steps: Vec<f64> = free.iter().map(|&i| parinfo[i].step).collect();
        let mut x: Vec<f64> = free.iter().map(|&i| base[i]).collect();

        let problem = Problem {
            residual,
            records: parinfo,
            ties,
            free,
            base,
            nfev: Cell::new(0),
        };
        let nfree = problem.free.len();

        let mut r = problem.evaluate(&x)?;
        if !r.iter().all(|v| v.is_finite()) {
            let mut output = SolverOutput::failure(
                SolverStatus::NonFinite,
                "Residual function produced non-finite values at the starting parameters",
                problem.base.clone(),
            );
            output.nfev = problem.nfev.get();
            return Ok(output);
        }
        if r.len() < nfree {
            return improper_input(
                format!(
                    "{} residuals cannot constrain {} free parameters",
                    r.len(),
                    nfree
                ),
                &start,
            );
        }

        let mut cost = r.dot(&r);
        if !cost.is_finite() {
            let failure = (
                SolverStatus::NonFinite,
                "Sum of squared residuals overflows at the starting parameters".to_string(),
            );
            return Ok(abort(&problem, &x, failure, 0));
        }

        let eval = |p: &[f64]| problem.evaluate(p);
        let mut jac = match free_jacobian(eval, &x, &r, &steps, &bounds, config.epsfcn) {
            Ok(jac) => jac,
            Err(failure) => return Ok(abort(&problem, &x, failure, 0)),
        };
        let mut lambda = config.initial_lambda;
        let mut niter = 0;
        let mut status = SolverStatus::MaxIterations;

        'outer: while niter < config.max_iterations {
            if cost == 0.0 {
                status = SolverStatus::FtolConverged;
                break;
            }
            niter += 1;

            if !config.quiet {
                log::info!(
                    "Iter {:>6}   CHI-SQUARE = {:.10e}   DOF = {}",
                    niter,
                    cost,
                    r.len() - nfree
                );
                log::info!("    P = {:?}", problem.expand(&x)?);
            }

            let jtj = jac.t().dot(&jac);
            let gradient = jac.t().dot(&r);
            if !jtj.iter().chain(gradient.iter()).all(|v| v.is_finite()) {
                let failure = (
                    SolverStatus::NonFinite,
                    "Normal equations contain non-finite values".to_string(),
                );
                return Ok(abort(&problem, &x, failure, niter));
            }
            let pegged = pegged_parameters(&x, &gradient, &jtj, &bounds);

            if max_gradient_cosine(&jtj, &gradient, cost, &pegged) <= config.gtol {
                status = SolverStatus::GtolConverged;
                break;
            }

            loop {
                let delta = match damped_step(&jtj, &gradient, lambda, &pegged) {
                    Some(delta) => delta,
                    None => {
                        lambda *= config.lambda_up_factor;
                        if lambda > config.max_lambda {
                            status = SolverStatus::FtolTooSmall;
                            break 'outer;
                        }
                        continue;
                    }
                };

                let x_new: Vec<f64> = x
                    .iter()
                    .zip(&delta)
                    .zip(&bounds)
                    .map(|((&xi, &di), limits)| limits.project(xi + di))
                    .collect();
                let step: Array1<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
                let xtol_met = step.dot(&step).sqrt() <= config.xtol * (norm(&x_new) + config.xtol);

                // A trial point the model or a tie cannot evaluate is rejected
                let r_new = problem
                    .evaluate(&x_new)
                    .ok()
                    .filter(|r_new| r_new.iter().all(|v| v.is_finite()));
                let cost_new = r_new.as_ref().map_or(f64::INFINITY, |r_new| r_new.dot(r_new));

                if let Some(r_new) = r_new.filter(|_| cost_new < cost) {
                    let predicted = jac.dot(&step) + &r;
                    let actual_reduction = 1.0 - cost_new / cost;
                    let predicted_reduction = 1.0 - predicted.dot(&predicted) / cost;
                    let ftol_met = actual_reduction <= config.ftol
                        && predicted_reduction.abs() <= config.ftol;

                    x = x_new;
                    r = r_new;
                    cost = cost_new;
                    lambda = (lambda * config.lambda_down_factor).max(config.min_lambda);
                    jac = match free_jacobian(eval, &x, &r, &steps, &bounds, config.epsfcn) {
                        Ok(jac) => jac,
                        Err(failure) => return Ok(abort(&problem, &x, failure, niter)),
                    };

                    status = match (ftol_met, xtol_met) {
                        (true, true) => SolverStatus::BothConverged,
                        (true, false) => SolverStatus::FtolConverged,
                        (false, true) => SolverStatus::XtolConverged,
                        (false, false) => break,
                    };
                    break 'outer;
                }

                if xtol_met {
                    status = SolverStatus::XtolConverged;
                    break 'outer;
                }
                lambda *= config.lambda_up_factor;
                if lambda > config.max_lambda {
                    status = SolverStatus::FtolTooSmall;
                    break 'outer;
                }
            }
        }

        if status == SolverStatus::MaxIterations && cost == 0.0 {
            status = SolverStatus::FtolConverged;
        }

        let params = problem.expand(&x)?;
        let npars = params.len();
        let covariance = covariance_from_jacobian(&jac)
            .map(|free_cov| expand_covariance(&free_cov, &problem.free, npars));
        let perror = covariance
            .as_ref()
            .map(|covar| standard_errors_from_covariance(covar).to_vec());

        if !config.quiet {
            log::info!(
                "Solver finished after {} iterations ({} evaluations): {}",
                niter,
                problem.nfev.get(),
                status
            );
        }

        Ok(SolverOutput {
            params,
            perror,
            covariance,
            fnorm: cost,
            status: status.code(),
            errmsg: String::new(),
            niter,
            nfev: problem.nfev.get(),
        })
    }
}
