//! Views over the site-blocked coordinate layout.
//!
//! A monomer type with `nsites` sites and `nmon` instances stores its coordinates in one
//! flat buffer of length `3 * nsites * nmon`. Each site owns a contiguous block holding
//! the x coordinates of all instances, then all y coordinates, then all z coordinates:
//!
//! ```text
//! site 0: x(m0) x(m1) .. x(mN) | y(m0) .. y(mN) | z(m0) .. z(mN)
//! site 1: x(m0) ..
//! ```
//!
//! Gradient buffers use the same layout, so a single offset addresses both.

use nalgebra::Vector3;

#[inline]
fn offset(nmon: usize, site: usize, mon: usize) -> usize {
    3 * nmon * site + mon
}

/// Expected buffer length for `nsites` sites of `nmon` instances.
pub fn block_len(nsites: usize, nmon: usize) -> usize {
    3 * nsites * nmon
}

/// Packs per-instance positions (`instances[mon][site]`) into the site-blocked layout.
///
/// Every instance must have the same number of sites.
pub fn pack_site_major(instances: &[Vec<[f64; 3]>]) -> Vec<f64> {
    let nmon = instances.len();
    let nsites = instances.first().map_or(0, Vec::len);
    let mut xyz = vec![0.0; block_len(nsites, nmon)];
    for (mon, sites) in instances.iter().enumerate() {
        debug_assert_eq!(sites.len(), nsites);
        for (site, position) in sites.iter().enumerate() {
            let base = offset(nmon, site, mon);
            xyz[base] = position[0];
            xyz[base + nmon] = position[1];
            xyz[base + 2 * nmon] = position[2];
        }
    }
    xyz
}

/// Read-only view over the coordinates of one monomer type.
#[derive(Debug, Clone, Copy)]
pub struct SiteBlock<'a> {
    xyz: &'a [f64],
    nmon: usize,
}

impl<'a> SiteBlock<'a> {
    pub fn new(xyz: &'a [f64], nmon: usize) -> Self {
        Self { xyz, nmon }
    }

    pub fn nmon(&self) -> usize {
        self.nmon
    }

    pub fn nsites(&self) -> usize {
        if self.nmon == 0 {
            0
        } else {
            self.xyz.len() / (3 * self.nmon)
        }
    }

    /// Position of `site` in instance `mon`. Panics if either is out of range.
    #[inline]
    pub fn position(&self, site: usize, mon: usize) -> Vector3<f64> {
        let base = offset(self.nmon, site, mon);
        Vector3::new(
            self.xyz[base],
            self.xyz[base + self.nmon],
            self.xyz[base + 2 * self.nmon],
        )
    }
}

/// Mutable view over a gradient buffer laid out like a [`SiteBlock`].
#[derive(Debug)]
pub struct SiteBlockMut<'a> {
    data: &'a mut [f64],
    nmon: usize,
}

impl<'a> SiteBlockMut<'a> {
    pub fn new(data: &'a mut [f64], nmon: usize) -> Self {
        Self { data, nmon }
    }

    pub fn nmon(&self) -> usize {
        self.nmon
    }

    /// Shortens the borrow so the view can be handed to a callee more than once.
    pub fn reborrow(&mut self) -> SiteBlockMut<'_> {
        SiteBlockMut {
            data: &mut *self.data,
            nmon: self.nmon,
        }
    }

    #[inline]
    pub fn get(&self, site: usize, mon: usize) -> Vector3<f64> {
        let base = offset(self.nmon, site, mon);
        Vector3::new(
            self.data[base],
            self.data[base + self.nmon],
            self.data[base + 2 * self.nmon],
        )
    }

    #[inline]
    pub fn add(&mut self, site: usize, mon: usize, value: &Vector3<f64>) {
        let base = offset(self.nmon, site, mon);
        self.data[base] += value.x;
        self.data[base + self.nmon] += value.y;
        self.data[base + 2 * self.nmon] += value.z;
    }

    #[inline]
    pub fn sub(&mut self, site: usize, mon: usize, value: &Vector3<f64>) {
        let base = offset(self.nmon, site, mon);
        self.data[base] -= value.x;
        self.data[base + self.nmon] -= value.y;
        self.data[base + 2 * self.nmon] -= value.z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_waters() -> Vec<Vec<[f64; 3]>> {
        vec![
            vec![[0.0, 0.0, 0.0], [0.96, 0.0, 0.0], [-0.24, 0.93, 0.0]],
            vec![[3.0, 0.1, 0.2], [3.96, 0.1, 0.2], [2.76, 1.03, 0.2]],
        ]
    }

    #[test]
    fn pack_site_major_groups_coordinates_by_site() {
        let xyz = pack_site_major(&two_waters());
        assert_eq!(xyz.len(), 18);
        // Site 1 block: x of both instances, then y, then z.
        assert_eq!(&xyz[6..12], &[0.96, 3.96, 0.0, 0.1, 0.0, 0.2]);
    }

    #[test]
    fn position_reads_back_packed_coordinates() {
        let instances = two_waters();
        let xyz = pack_site_major(&instances);
        let block = SiteBlock::new(&xyz, 2);

        assert_eq!(block.nsites(), 3);
        for (mon, sites) in instances.iter().enumerate() {
            for (site, p) in sites.iter().enumerate() {
                assert_eq!(block.position(site, mon), Vector3::new(p[0], p[1], p[2]));
            }
        }
    }

    #[test]
    fn nsites_of_empty_block_is_zero() {
        let block = SiteBlock::new(&[], 0);
        assert_eq!(block.nsites(), 0);
    }

    #[test]
    fn add_and_sub_accumulate_in_place() {
        let mut data = vec![1.0; 18];
        let mut grad = SiteBlockMut::new(&mut data, 2);

        grad.add(2, 1, &Vector3::new(1.0, 2.0, 3.0));
        grad.sub(2, 1, &Vector3::new(0.5, 0.5, 0.5));
        grad.reborrow().add(0, 0, &Vector3::new(1.0, 0.0, 0.0));

        assert_eq!(grad.get(2, 1), Vector3::new(1.5, 2.5, 3.5));
        assert_eq!(grad.get(0, 0), Vector3::new(2.0, 1.0, 1.0));
        assert_eq!(grad.get(1, 1), Vector3::new(1.0, 1.0, 1.0));
    }
}
