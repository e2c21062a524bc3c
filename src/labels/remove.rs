//! Neighbour-majority replacement of a single label

use ndarray::Array3;

/// Neighbour offsets (dz, dx, dy) in the order votes are collected.
///
/// 8 in-plane neighbours, then a 5-point cross on the slice above and on the
/// slice below. Ties between equally frequent labels go to the label met
/// first in this order.
pub const STENCIL: [(isize, isize, isize); 18] = [
    // dz = 0
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, -1),
    (0, 0, 1),
    (0, 1, 1),
    (0, -1, 1),
    (0, 1, -1),
    (0, -1, -1),
    // dz = +1
    (1, 0, 0),
    (1, 1, 0),
    (1, -1, 0),
    (1, 0, -1),
    (1, 0, 1),
    // dz = -1
    (-1, 0, 0),
    (-1, 1, 0),
    (-1, -1, 0),
    (-1, 0, -1),
    (-1, 0, 1),
];

/// Most frequent non-`target` label around voxel (z, x, y)
///
/// Neighbours outside the x/y extent are skipped. Returns `None` when every
/// in-bounds neighbour holds `target`, or when `z` lacks a slice on either side.
pub fn majority_neighbor(volume: &Array3<u8>, z: usize, x: usize, y: usize, target: u8) -> Option<u8> {
    let (nz, nx, ny) = volume.dim();
    if z == 0 || z + 1 >= nz {
        return None;
    }

    let mut labels = [0u8; STENCIL.len()];
    let mut counts = [0u8; STENCIL.len()];
    let mut n_distinct = 0;

    for &(dz, dx, dy) in STENCIL.iter() {
        let xx = x as isize + dx;
        let yy = y as isize + dy;
        if xx < 0 || yy < 0 || xx >= nx as isize || yy >= ny as isize {
            continue;
        }
        let zz = (z as isize + dz) as usize;
        let v = volume[[zz, xx as usize, yy as usize]];
        if v == target {
            continue;
        }
        match labels[..n_distinct].iter().position(|&l| l == v) {
            Some(i) => counts[i] += 1,
            None => {
                labels[n_distinct] = v;
                counts[n_distinct] = 1;
                n_distinct += 1;
            }
        }
    }

    // Strict comparison keeps the first-seen label on ties
    let mut best: Option<(u8, u8)> = None;
    for i in 0..n_distinct {
        match best {
            Some((_, c)) if c >= counts[i] => {}
            _ => best = Some((labels[i], counts[i])),
        }
    }
    best.map(|(label, _)| label)
}

/// Replace every interior voxel holding `target` with its neighbourhood majority
///
/// Voxels in the first and last z-slice are left untouched. All votes are
/// taken on the volume as it was before the call and applied together
/// afterwards, so traversal order has no effect. Voxels whose whole
/// neighbourhood holds `target` keep it.
///
/// # Returns
/// Number of voxels replaced
pub fn remove_label(volume: &mut Array3<u8>, target: u8) -> usize {
    let nz = volume.dim().0;
    if nz < 3 {
        return 0;
    }

    let mut replacements = Vec::new();
    for ((z, x, y), &v) in volume.indexed_iter() {
        if v != target || z == 0 || z == nz - 1 {
            continue;
        }
        if let Some(label) = majority_neighbor(volume, z, x, y, target) {
            replacements.push(([z, x, y], label));
        }
    }

    for &(idx, label) in &replacements {
        volume[idx] = label;
    }
    replacements.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u8 = 150;

    #[test]
    fn test_majority_five_vs_three() {
        // 3x3x3 block: centre is the target; 5 stencil neighbours are A, 3 are B,
        // the rest hold the target and are excluded from the vote.
        let (a, b) = (1u8, 29u8);
        let mut vol = Array3::from_elem((3, 3, 3), T);
        let centre = (1usize, 1usize, 1usize);
        let offsets_a = [(0, 1, 0), (0, -1, 0), (1, 0, 0), (-1, 0, 0), (0, 1, 1)];
        let offsets_b = [(0, 0, 1), (0, 0, -1), (1, 1, 0)];
        let at = |(dz, dx, dy): (isize, isize, isize)| {
            [
                (centre.0 as isize + dz) as usize,
                (centre.1 as isize + dx) as usize,
                (centre.2 as isize + dy) as usize,
            ]
        };
        for o in offsets_a {
            vol[at(o)] = a;
        }
        for o in offsets_b {
            vol[at(o)] = b;
        }

        let replaced = remove_label(&mut vol, T);
        assert_eq!(vol[[1, 1, 1]], a, "centre should take the majority label");
        // Other interior-slice targets with non-target neighbours are replaced too
        assert!(replaced >= 1);
    }

    #[test]
    fn test_tie_goes_to_first_in_stencil_order() {
        // Two labels with one vote each: +x comes before -x
        let mut vol = Array3::from_elem((3, 3, 3), T);
        vol[[1, 2, 1]] = 7; // +x
        vol[[1, 0, 1]] = 9; // -x
        assert_eq!(majority_neighbor(&vol, 1, 1, 1, T), Some(7));

        let mut vol = Array3::from_elem((3, 3, 3), T);
        vol[[2, 1, 1]] = 9; // slice above, centre
        vol[[1, 0, 0]] = 7; // in-plane diagonal (-x, -y), visited first
        assert_eq!(majority_neighbor(&vol, 1, 1, 1, T), Some(7));
    }

    #[test]
    fn test_end_slices_have_no_vote() {
        let mut vol = Array3::zeros((3, 3, 3));
        vol[[0, 1, 1]] = T;
        vol[[2, 1, 1]] = T;
        assert_eq!(majority_neighbor(&vol, 0, 1, 1, T), None);
        assert_eq!(majority_neighbor(&vol, 2, 1, 1, T), None);
        assert_eq!(majority_neighbor(&vol, 7, 1, 1, T), None);
        assert_eq!(majority_neighbor(&vol, 1, 1, 1, T), Some(0));
    }

    #[test]
    fn test_corners_are_not_part_of_off_plane_stencil() {
        // Off-plane diagonals are outside the 18-neighbour stencil
        let mut vol = Array3::from_elem((3, 3, 3), T);
        vol[[0, 0, 0]] = 5;
        vol[[2, 2, 2]] = 5;
        assert_eq!(majority_neighbor(&vol, 1, 1, 1, T), None);
    }

    #[test]
    fn test_batch_update_uses_pre_pass_volume() {
        // A row of targets next to a single label: in a sequential update the
        // replacement would propagate along the row in one call.
        let mut vol = Array3::zeros((3, 1, 5));
        for y in 0..5 {
            vol[[1, 0, y]] = T;
        }
        vol[[0, 0, 0]] = T;
        vol[[2, 0, 0]] = T;
        for y in 1..5 {
            vol[[0, 0, y]] = T;
            vol[[2, 0, y]] = T;
        }
        vol[[1, 0, 0]] = 3;
        // Only y = 1 has a non-target neighbour (y = 0)
        let replaced = remove_label(&mut vol, T);
        assert_eq!(replaced, 1);
        assert_eq!(vol[[1, 0, 1]], 3);
        assert_eq!(vol[[1, 0, 2]], T);
    }

    #[test]
    fn test_first_and_last_slices_untouched() {
        let mut vol = Array3::zeros((4, 3, 3));
        vol[[0, 1, 1]] = T;
        vol[[3, 1, 1]] = T;
        vol[[2, 1, 1]] = T;
        let replaced = remove_label(&mut vol, T);
        assert_eq!(replaced, 1);
        assert_eq!(vol[[0, 1, 1]], T);
        assert_eq!(vol[[3, 1, 1]], T);
        assert_eq!(vol[[2, 1, 1]], 0);
    }

    #[test]
    fn test_edge_voxels_skip_out_of_plane_neighbours() {
        // Target on the x/y corner of an interior slice
        let mut vol = Array3::from_elem((3, 4, 4), 2u8);
        vol[[1, 0, 0]] = T;
        assert_eq!(remove_label(&mut vol, T), 1);
        assert_eq!(vol[[1, 0, 0]], 2);

        let mut vol = Array3::from_elem((3, 4, 4), 2u8);
        vol[[1, 3, 3]] = T;
        assert_eq!(remove_label(&mut vol, T), 1);
        assert_eq!(vol[[1, 3, 3]], 2);
    }

    #[test]
    fn test_too_thin_volume_is_noop() {
        let mut vol = Array3::from_elem((2, 3, 3), T);
        assert_eq!(remove_label(&mut vol, T), 0);
    }
}
