//! Plain-text rendering of matrices and fidelities.

use num_complex::Complex64;
use qchannels_theory::Matrix;

/// `re+imi` with four decimals; a zero imaginary part is omitted.
pub fn format_complex(z: Complex64) -> String {
    let re = if z.re.abs() < 5e-5 { 0.0 } else { z.re };
    if z.im.abs() < 5e-5 {
        format!("{re:.4}")
    } else {
        format!("{re:.4}{:+.4}i", z.im)
    }
}

/// One row per line, columns right-aligned.
pub fn format_matrix(m: &Matrix) -> String {
    let cells: Vec<Vec<String>> = m
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|&z| format_complex(z)).collect())
        .collect();
    let width = cells.iter().flatten().map(String::len).max().unwrap_or(0);
    cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| format!("{cell:>width$}"))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
