//! # Example: Lotka-Volterra
//!
//! Predator-prey dynamics with the parameters passed to the right-hand side
//! and the total population reported as an auxiliary output.
//!
//! Equations:
//! dx/dt = a x - b x y
//! dy/dt = c x y - d y
//!
//! Initial condition: x(0) = 10, y(0) = 5
//!

use rkauto::prelude::*;

struct Rates {
    a: Float,
    b: Float,
    c: Float,
    d: Float,
}

struct LotkaVolterra;

impl ODE<Rates> for LotkaVolterra {
    fn ode(&self, _t: Float, y: &[Float], p: &Rates, dydt: &mut [Float], out: &mut [Float]) {
        let (prey, predator) = (y[0], y[1]);
        dydt[0] = p.a * prey - p.b * prey * predator;
        dydt[1] = p.c * prey * predator - p.d * predator;
        out[0] = prey + predator;
    }

    fn nout(&self) -> usize {
        1
    }
}

fn main() {
    let rates = Rates {
        a: 1.5,
        b: 0.2,
        c: 0.1,
        d: 1.0,
    };
    let times: Vec<Float> = (0..=30).map(|i| i as Float * 0.5).collect();

    let options = Options::builder()
        .rtol(1e-6)
        .atol([1e-8, 1e-8])
        .hmax(0.5)
        .build();

    match rk_auto(
        &mut LotkaVolterra,
        &[10.0, 5.0],
        &times,
        &rates,
        &Tableau::rk45dp7(),
        &options,
    ) {
        Ok(sol) => {
            println!("Final status: {:?}", sol.status());
            println!("istate: {:?}", sol.diagnostics.istate());
            if !sol.status().completed() {
                println!("Only {} of {} rows reached", sol.reached(), sol.nrows());
            }
            for r in 0..sol.nrows() {
                let (t, y, out) = sol.row(r);
                println!(
                    "t = {:5.2}, prey = {:8.4}, predator = {:8.4}, total = {:8.4}",
                    t, y[0], y[1], out[0]
                );
            }
        }
        Err(errors) => eprintln!("Integration failed: {:?}", errors),
    }
}
