use core::ops::Range;
use rayon::prelude::*;
use crate::index_space::IndexSpace;




/**
 * A patch is a mapping from a rectangular region of a signed index space to
 * associated field values. Each index (a grid cell, or a cell face) carries
 * `num_fields` values, which are contiguous in memory; cells are laid out in
 * row-major order, so the final index increases fastest.
 *
 * The logical shape of a patch is `(num_fields, ni, nj)`. Operations which
 * combine patches assert that their shapes agree.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    space: IndexSpace,
    num_fields: usize,
    data: Vec<f64>,
}




// ============================================================================
impl Patch {


    /**
     * Generate a patch covering the given index space, with all values
     * zero.
     */
    pub fn zeros(num_fields: usize, space: IndexSpace) -> Self {
        Self {
            data: vec![0.0; space.len() * num_fields],
            space,
            num_fields,
        }
    }


    /**
     * Generate a patch covering the given index space, with values defined
     * from a closure that writes the fields of each index into a slice.
     */
    pub fn from_slice_function<F>(space: IndexSpace, num_fields: usize, f: F) -> Self
    where
        F: Fn((i64, i64), &mut [f64]),
    {
        let mut patch = Self::zeros(num_fields, space);
        patch.fill_with(f);
        patch
    }


    /**
     * Overwrite every value in the patch from a closure, as in
     * `from_slice_function`.
     */
    pub fn fill_with<F>(&mut self, f: F)
    where
        F: Fn((i64, i64), &mut [f64]),
    {
        let nq = self.num_fields;
        for (index, slice) in self.space.iter().zip(self.data.chunks_exact_mut(nq)) {
            f(index, slice)
        }
    }


    pub fn index_space(&self) -> &IndexSpace {
        &self.space
    }


    pub fn num_fields(&self) -> usize {
        self.num_fields
    }


    /**
     * Return the logical shape `(num_fields, ni, nj)` of this patch.
     */
    pub fn shape(&self) -> (usize, usize, usize) {
        let (ni, nj) = self.space.dim();
        (self.num_fields, ni, nj)
    }


    /**
     * Return the number of values in one row (fixed `i`) of the backing
     * array.
     */
    pub fn row_len(&self) -> usize {
        self.space.dim().1 * self.num_fields
    }


    pub fn data(&self) -> &[f64] {
        &self.data
    }


    /**
     * Return the fields at the given index.
     */
    pub fn get_slice(&self, index: (i64, i64)) -> &[f64] {
        self.validate_index(index);
        let n = self.space.row_major_offset(index) * self.num_fields;
        &self.data[n .. n + self.num_fields]
    }


    pub fn get_slice_mut(&mut self, index: (i64, i64)) -> &mut [f64] {
        self.validate_index(index);
        let n = self.space.row_major_offset(index) * self.num_fields;
        &mut self.data[n .. n + self.num_fields]
    }


    /**
     * Return a single field value at the given index.
     */
    pub fn get(&self, index: (i64, i64), field: usize) -> f64 {
        self.get_slice(index)[field]
    }


    /**
     * Copy all the fields at one index to another index of this patch.
     */
    pub fn copy_cell(&mut self, from: (i64, i64), to: (i64, i64)) {
        self.validate_index(from);
        self.validate_index(to);
        let nq = self.num_fields;
        let src = self.space.row_major_offset(from) * nq;
        let dst = self.space.row_major_offset(to) * nq;
        self.data.copy_within(src .. src + nq, dst)
    }


    /**
     * Return an iterator over the field slices of a subset of this patch, in
     * row-major order.
     */
    pub fn select(&self, space: IndexSpace) -> impl Iterator<Item = &[f64]> + '_ {
        assert!(
            self.space.contains_space(&space),
            "selection {:?} is not contained in patch {:?}", space, self.space);

        let (di, dj): (Range<i64>, Range<i64>) = space.into();
        di.flat_map(move |i| dj.clone().map(move |j| self.get_slice((i, j))))
    }


    /**
     * Return an iterator over the mutable field slices of the whole patch.
     */
    pub fn iter_data_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.data.chunks_exact_mut(self.num_fields)
    }


    /**
     * Return a parallel iterator over the rows of this patch, paired with
     * the `i` index of each row.
     */
    pub fn par_rows(&self) -> impl IndexedParallelIterator<Item = (i64, &[f64])> {
        let i0 = self.space.start().0;
        let len = self.row_len().max(1);
        self.data
            .par_chunks(len)
            .enumerate()
            .map(move |(n, row)| (i0 + n as i64, row))
    }


    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = (i64, &mut [f64])> {
        let i0 = self.space.start().0;
        let len = self.row_len().max(1);
        self.data
            .par_chunks_mut(len)
            .enumerate()
            .map(move |(n, row)| (i0 + n as i64, row))
    }


    /**
     * Copy a subset of this patch into a new patch.
     */
    pub fn extract(&self, space: IndexSpace) -> Self {
        let data = self.select(space.clone()).flatten().copied().collect();
        Self { space, num_fields: self.num_fields, data }
    }


    /**
     * Generate a new patch on the same index space, with each slice mapped
     * through a closure. The output may have a different number of fields.
     */
    pub fn map<F>(&self, num_fields: usize, f: F) -> Self
    where
        F: Fn(&[f64], &mut [f64]),
    {
        let mut result = Self::zeros(num_fields, self.space.clone());
        self.map_into(&mut result, f);
        result
    }


    /**
     * Like `map`, but the closure is fallible and the first error is
     * returned.
     */
    pub fn try_map<F, E>(&self, num_fields: usize, f: F) -> Result<Self, E>
    where
        F: Fn(&[f64], &mut [f64]) -> Result<(), E>,
    {
        let mut result = Self::zeros(num_fields, self.space.clone());

        for (s, r) in self.data.chunks_exact(self.num_fields).zip(result.iter_data_mut()) {
            f(s, r)?
        }
        Ok(result)
    }


    /**
     * Map each slice of this patch into the slice at the same index in
     * another patch. The other patch may have a different number of fields,
     * but must cover the same index space.
     */
    pub fn map_into<F>(&self, target: &mut Self, f: F)
    where
        F: Fn(&[f64], &mut [f64]),
    {
        assert_eq!(self.space, target.space, "patches must cover the same index space");

        let nq = self.num_fields;
        for (s, t) in self.data.chunks_exact(nq).zip(target.iter_data_mut()) {
            f(s, t)
        }
    }


    /**
     * Return the sum of each field over a subset of the patch.
     */
    pub fn totals(&self, space: IndexSpace) -> Vec<f64> {
        let mut result = vec![0.0; self.num_fields];

        for slice in self.select(space) {
            for (r, x) in result.iter_mut().zip(slice) {
                *r += x
            }
        }
        result
    }


    /**
     * Return the smallest and largest value of a field over a subset of the
     * patch.
     */
    pub fn field_range(&self, space: IndexSpace, field: usize) -> (f64, f64) {
        self.select(space)
            .map(|slice| slice[field])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), x| (a.min(x), b.max(x)))
    }


    fn validate_index(&self, index: (i64, i64)) {
        if !self.space.contains(index) {
            let (i0, j0) = self.space.start();
            let (i1, j1) = self.space.end();
            panic!("index ({} {}) out of range on patch ({}..{} {}..{})",
                index.0,
                index.1,
                i0,
                i1,
                j0,
                j1);
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::Patch;
    use crate::index_space::range2d;
    use rayon::prelude::*;

    fn ramp() -> Patch {
        Patch::from_slice_function(range2d(-2..6, -2..6), 2, |(i, j), f| {
            f[0] = i as f64;
            f[1] = j as f64;
        })
    }

    #[test]
    fn patch_indexing_works_with_guard_zones() {
        let patch = ramp();
        assert_eq!(patch.shape(), (2, 8, 8));
        assert_eq!(patch.get_slice((-2, -1)), &[-2.0, -1.0]);
        assert_eq!(patch.get((5, 3), 1), 3.0);
    }

    #[test]
    fn extract_and_select_agree() {
        let patch = ramp();
        let sub = patch.extract(range2d(0..4, 1..3));
        assert_eq!(sub.shape(), (2, 4, 2));
        assert_eq!(sub.get_slice((3, 2)), &[3.0, 2.0]);
        assert_eq!(patch.select(range2d(0..4, 1..3)).count(), 8);
    }

    #[test]
    fn copy_cell_moves_all_fields() {
        let mut patch = ramp();
        patch.copy_cell((4, 4), (-2, -2));
        assert_eq!(patch.get_slice((-2, -2)), &[4.0, 4.0]);
    }

    #[test]
    fn parallel_rows_carry_their_index() {
        let mut patch = ramp();
        patch.par_rows_mut().for_each(|(i, row)| {
            for f in row.chunks_exact_mut(2) {
                assert_eq!(f[0], i as f64);
                f[1] = 0.0;
            }
        });
        assert_eq!(patch.totals(range2d(0..6, 0..6))[1], 0.0);
    }

    #[test]
    fn field_range_finds_extrema() {
        let patch = ramp();
        assert_eq!(patch.field_range(range2d(0..4, 0..4), 0), (0.0, 3.0));
    }

    #[test]
    #[should_panic]
    fn out_of_range_index_panics() {
        ramp().get_slice((6, 0));
    }
}
