/// Triangulates a `u_count × v_count` vertex grid laid out row by row
/// (`index = v * u_count + u`), two triangles per quad.
///
/// A wrapped direction connects its last row/column back to the first, so a
/// grid wrapped in both directions yields a closed surface with
/// `2 * u_count * v_count` triangles and no boundary edges. Wrapped directions
/// need at least 3 samples, open ones at least 2; smaller counts are raised.
#[must_use]
pub fn triangulate_grid_wrapped(
    u_count: usize,
    v_count: usize,
    wrap_u: bool,
    wrap_v: bool,
) -> Vec<u32> {
    let u_count = if wrap_u { u_count.max(3) } else { u_count.max(2) };
    let v_count = if wrap_v { v_count.max(3) } else { v_count.max(2) };

    let quad_u = if wrap_u { u_count } else { u_count - 1 };
    let quad_v = if wrap_v { v_count } else { v_count - 1 };
    let mut indices = Vec::with_capacity(quad_u * quad_v * 6);

    let stride = u_count;
    for v in 0..quad_v {
        let v0 = v;
        let v1 = if wrap_v { (v + 1) % v_count } else { v + 1 };

        for u in 0..quad_u {
            let u0 = u;
            let u1 = if wrap_u { (u + 1) % u_count } else { u + 1 };

            let i0 = (v0 * stride + u0) as u32;
            let i1 = (v0 * stride + u1) as u32;
            let i2 = (v1 * stride + u0) as u32;
            let i3 = (v1 * stride + u1) as u32;

            // Winding keeps du × dv as the face normal.
            indices.extend_from_slice(&[i0, i1, i2]);
            indices.extend_from_slice(&[i2, i1, i3]);
        }
    }

    indices
}
