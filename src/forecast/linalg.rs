// ============================================================================
// Résolution des équations normales
// ============================================================================
// Le modèle additif se ramène à un petit système linéaire symétrique
// (une douzaine d'inconnues). Élimination de Gauss avec pivot partiel,
// suffisant à cette taille ; pas besoin d'une crate d'algèbre linéaire.
// ============================================================================

/// Résout `a * x = b` en place. `a` est carrée (n x n), `b` de longueur n.
///
/// Retourne `None` si le système est singulier (pivot numériquement nul).
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    debug_assert!(a.len() == n && a.iter().all(|row| row.len() == n));

    for col in 0..n {
        // Pivot partiel : ligne au plus grand coefficient dans la colonne
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().partial_cmp(&a[j][col].abs()).unwrap())?;

        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        // Élimine la colonne sous le pivot
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // Substitution arrière
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }

    Some(x)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_2x2() {
        // 2x + y = 5 ; x + 3y = 10  =>  x = 1, y = 3
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];

        let x = solve(a, b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9);
        assert!((x[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_solve_identity() {
        let a = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        let b = vec![4.0, -2.0, 7.5];

        let x = solve(a, b).unwrap();
        assert_eq!(x, vec![4.0, -2.0, 7.5]);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        // Pivot nul en (0,0) : l'élimination naïve diviserait par zéro
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let b = vec![2.0, 3.0];

        let x = solve(a, b).unwrap();
        assert!((x[0] - 3.0).abs() < 1e-9);
        assert!((x[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_solve_singular() {
        // Deux lignes colinéaires
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let b = vec![3.0, 6.0];

        assert!(solve(a, b).is_none());
    }
}
