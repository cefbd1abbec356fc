/// A first-order system of ordinary differential equations with `N` states.
///
/// Implementors define `dy/dt = f(t, y)`. Integrators may evaluate the
/// derivative many times per step, at trial times that are not monotonic and
/// at states that are never accepted, so implementations must be pure
/// functions of `(t, y)`.
///
/// The derivative is infallible. Degenerate states are expected to surface as
/// non-finite components, which adaptive integrators treat as a failed step.
pub trait OdeSystem<const N: usize> {
    /// Returns the derivative of the state `y` at time `t`.
    fn derivative(&self, t: f64, y: &[f64; N]) -> [f64; N];
}

/// Blanket implementation for derivative closures.
impl<F, const N: usize> OdeSystem<N> for F
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    fn derivative(&self, t: f64, y: &[f64; N]) -> [f64; N] {
        self(t, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exponential decay with rate `k`.
    struct Decay {
        k: f64,
    }

    impl OdeSystem<1> for Decay {
        fn derivative(&self, _t: f64, y: &[f64; 1]) -> [f64; 1] {
            [-self.k * y[0]]
        }
    }

    fn evaluate<S: OdeSystem<N>, const N: usize>(system: &S, t: f64, y: [f64; N]) -> [f64; N] {
        system.derivative(t, &y)
    }

    #[test]
    fn struct_system() {
        assert_eq!(evaluate(&Decay { k: 0.5 }, 0.0, [4.0]), [-2.0]);
    }

    #[test]
    fn closure_system() {
        let oscillator = |_t: f64, y: &[f64; 2]| [y[1], -y[0]];
        assert_eq!(evaluate(&oscillator, 1.0, [1.0, 0.0]), [0.0, -1.0]);
    }

    #[test]
    fn time_dependent_closure() {
        let forcing = |t: f64, _y: &[f64; 1]| [2.0 * t];
        assert_eq!(evaluate(&forcing, 3.0, [0.0]), [6.0]);
    }
}
