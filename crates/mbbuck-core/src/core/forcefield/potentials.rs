#[inline]
pub fn buckingham_repulsion(dist: f64, a: f64, b: f64) -> f64 {
    a * (-b * dist).exp()
}

/// Returns the repulsion and its radial derivative `dE/dr`.
#[inline]
pub fn buckingham_repulsion_with_derivative(dist: f64, a: f64, b: f64) -> (f64, f64) {
    let energy = a * (-b * dist).exp();
    (energy, -b * energy)
}
