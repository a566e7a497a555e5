//! # Example: Exponential Decay
//!
//! Solve the exponential decay equation and compare against the exact
//! solution on a grid of output times.
//!
//! Equations:
//! dy/dt = -k y
//!
//! Initial condition: y(0) = 1.0, k = 0.5
//!

use rkauto::prelude::*;

struct Decay;

impl ODE<Float> for Decay {
    fn ode(&self, _t: Float, y: &[Float], k: &Float, dydt: &mut [Float], _out: &mut [Float]) {
        dydt[0] = -k * y[0];
    }
}

fn main() {
    let k = 0.5;
    let y0 = [1.0];
    let times: Vec<Float> = (0..=20).map(|i| i as Float * 0.5).collect();

    let options = Options::builder().rtol(1e-8).atol(1e-8).build();

    // Dense output (Dormand-Prince) and Neville-Aitken interpolation (Cash-Karp).
    for method in [Tableau::rk45dp7(), Tableau::rk45ck()] {
        match rk_auto(&mut Decay, &y0, &times, &k, &method, &options) {
            Ok(sol) => {
                println!("Method: {}", method.name);
                println!("Final status: {:?}", sol.status());
                println!("Number of function evaluations: {}", sol.diagnostics.nfev);
                println!("Number of steps taken: {}", sol.diagnostics.nsteps);
                println!("Number of accepted steps: {}", sol.diagnostics.naccpt);
                println!("Number of rejected steps: {}", sol.diagnostics.nrejct);

                for r in 0..sol.nrows() {
                    let (t, y, _) = sol.row(r);
                    let exact = (-k * t).exp();
                    println!("t = {:5.2}, y = {:.10}, error = {:.2e}", t, y[0], y[0] - exact);
                }
            }
            Err(errors) => eprintln!("Integration failed: {:?}", errors),
        }
    }
}
