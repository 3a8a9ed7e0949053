//! Guard-cell exchange for a single-process mesh.
//!
//! A partition owns both ends of a periodic line only when it is the first and
//! last y partition at once; those lines are wrapped locally. Guard cells that
//! face another partition are filled by the external decomposition layer, and
//! guard cells at physical edges by boundary conditions.

use super::structured::Mesh;
use crate::field::Field3D;

impl Mesh {
    /// Fill y guard cells of periodic lines owned entirely by this partition.
    ///
    /// Must be called before any parallel stencil reads guard cells.
    ///
    /// # Panics
    /// If `f` does not live on this mesh.
    pub fn communicate(&self, f: &mut Field3D) {
        assert!(
            std::ptr::eq(f.mesh().as_ref(), self),
            "communicate called with a field from another mesh"
        );
        let nz = self.nz;
        let ny_interior = self.yend - self.ystart + 1;

        for x in 0..self.nx {
            let line = self.line(x);
            if !(line.periodic_y && line.first_y && line.last_y) {
                continue;
            }
            for g in 1..=self.myg() {
                // Lower guard g cells below ystart wraps to the top of the interior
                let lower = self.ystart - g;
                let lower_src = lower + ny_interior;
                let upper = self.yend + g;
                let upper_src = upper - ny_interior;
                for z in 0..nz {
                    let v = f.data()[self.index3d(x, lower_src, z)];
                    f.data_mut()[self.index3d(x, lower, z)] = v;
                    let v = f.data()[self.index3d(x, upper_src, z)];
                    f.data_mut()[self.index3d(x, upper, z)] = v;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::field::Field3D;
    use crate::mesh::MeshBuilder;

    #[test]
    fn test_periodic_wrap() {
        let mesh = MeshBuilder::new(1, 4, 1).periodic_y().build();
        let mut f = Field3D::from_fn(&mesh, |_, y, _| y as f64);
        mesh.communicate(&mut f);

        // Interior y = 2..=5
        assert_eq!(f[(2, 1, 0)], 5.0);
        assert_eq!(f[(2, 0, 0)], 4.0);
        assert_eq!(f[(2, 6, 0)], 2.0);
        assert_eq!(f[(2, 7, 0)], 3.0);
    }

    #[test]
    fn test_open_lines_untouched() {
        let mesh = MeshBuilder::new(1, 4, 1).build();
        let mut f = Field3D::from_fn(&mesh, |_, y, _| y as f64);
        mesh.communicate(&mut f);
        assert_eq!(f[(2, 1, 0)], 1.0);
        assert_eq!(f[(2, 6, 0)], 6.0);
    }

    #[test]
    fn test_partitioned_periodic_untouched() {
        let mesh = MeshBuilder::new(1, 4, 1)
            .periodic_y()
            .with_y_partition(true, false)
            .build();
        let mut f = Field3D::from_fn(&mesh, |_, y, _| y as f64);
        mesh.communicate(&mut f);
        assert_eq!(f[(2, 1, 0)], 1.0);
    }
}
