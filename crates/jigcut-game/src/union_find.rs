/// Disjoint sets over `0..n`, merged by size.
///
/// Union by size keeps every tree at most `log2(n)` deep, so lookups need no path
/// compression and can take `&self`.
#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub(crate) fn find(&self, mut x: usize) -> usize {
        while self.parent[x] != x {
            x = self.parent[x];
        }
        x
    }

    pub(crate) fn same(&self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }

    pub(crate) fn size_of(&self, x: usize) -> usize {
        self.size[self.find(x)]
    }

    /// Merges the sets of `x` and `y`. Returns `false` if they were already one set.
    pub(crate) fn union(&mut self, x: usize, y: usize) -> bool {
        let (mut x, mut y) = (self.find(x), self.find(y));
        if x == y {
            return false;
        }
        if self.size[x] < self.size[y] {
            std::mem::swap(&mut x, &mut y);
        }
        self.parent[y] = x;
        self.size[x] += self.size[y];
        true
    }
}
