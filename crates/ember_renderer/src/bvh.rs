//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding boxes over shared primitives. Construction
//! splits at the median after sorting on a randomly chosen axis; the top
//! levels are built concurrently on a rayon pool.

use crate::{hittable::random_index, HitRecord, Hittable, Ray};
use ember_math::{Aabb, Interval, Vec3};
use rand::{Rng, RngCore};
use rayon::ThreadPool;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Tree levels above this depth split their two halves across the pool.
const PARALLEL_BUILD_DEPTH: usize = 4;

/// Ranges smaller than this are always built sequentially.
const PARALLEL_MIN_SPAN: usize = 64;

/// BVH node - a branch with two children or a leaf with one primitive.
///
/// Branches own their children exclusively; leaves hold a shared handle to
/// the primitive, which also lives in the scene lists.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a single primitive.
    Leaf {
        object: Arc<dyn Hittable>,
        bbox: Aabb,
    },
    /// Empty node (for edge cases).
    Empty,
}

impl BvhNode {
    /// Build over `objects`, reordering the slice in place.
    ///
    /// `parallel` enables the concurrent split for the first
    /// [`PARALLEL_BUILD_DEPTH`] levels; it uses whichever rayon pool the
    /// call runs in.
    fn build(objects: &mut [Arc<dyn Hittable>], depth: usize, parallel: bool) -> Self {
        let axis = rand::thread_rng().gen_range(0..3);

        match objects.len() {
            0 => BvhNode::Empty,
            1 => BvhNode::leaf(objects[0].clone()),
            2 => {
                if box_compare(&objects[1], &objects[0], axis) == Ordering::Less {
                    objects.swap(0, 1);
                }
                BvhNode::branch(
                    BvhNode::leaf(objects[0].clone()),
                    BvhNode::leaf(objects[1].clone()),
                )
            }
            n => {
                objects.sort_by(|a, b| box_compare(a, b, axis));

                let (left_objects, right_objects) = objects.split_at_mut(n / 2);
                let (left, right) =
                    if parallel && depth < PARALLEL_BUILD_DEPTH && n >= PARALLEL_MIN_SPAN {
                        rayon::join(
                            || BvhNode::build(left_objects, depth + 1, true),
                            || BvhNode::build(right_objects, depth + 1, true),
                        )
                    } else {
                        (
                            BvhNode::build(left_objects, depth + 1, parallel),
                            BvhNode::build(right_objects, depth + 1, parallel),
                        )
                    };

                BvhNode::branch(left, right)
            }
        }
    }

    fn leaf(object: Arc<dyn Hittable>) -> Self {
        let bbox = object.bounding_box();
        BvhNode::Leaf { object, bbox }
    }

    fn branch(left: BvhNode, right: BvhNode) -> Self {
        let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    /// Number of leaves under this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Longest root-to-leaf path, counting the root as 1.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Order two primitives by the minimum of their boxes on `axis`.
fn box_compare(a: &Arc<dyn Hittable>, b: &Arc<dyn Hittable>, axis: usize) -> Ordering {
    let a_min = a.bounding_box().axis_interval(axis).min;
    let b_min = b.bounding_box().axis_interval(axis).min;
    a_min.total_cmp(&b_min)
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { object, .. } => object.hit(ray, ray_t),

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max));

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

/// Root of a BVH.
///
/// Besides the tree it keeps the primitives in their original order, used
/// only to sample them uniformly as lights.
pub struct Bvh {
    root: BvhNode,
    primitives: Vec<Arc<dyn Hittable>>,
}

impl Bvh {
    /// Build sequentially on the calling thread.
    pub fn new(primitives: Vec<Arc<dyn Hittable>>) -> Self {
        Self::build_with(primitives, None)
    }

    /// Build on `pool`, splitting the upper levels across its workers.
    ///
    /// Blocks until the whole tree is finished.
    pub fn build_in(pool: &ThreadPool, primitives: Vec<Arc<dyn Hittable>>) -> Self {
        Self::build_with(primitives, Some(pool))
    }

    fn build_with(primitives: Vec<Arc<dyn Hittable>>, pool: Option<&ThreadPool>) -> Self {
        let start = Instant::now();
        let mut objects = primitives.clone();

        let root = match pool {
            Some(pool) => pool.install(|| BvhNode::build(&mut objects, 0, true)),
            None => BvhNode::build(&mut objects, 0, false),
        };

        log::info!(
            "Built BVH over {} primitives (depth {}) in {:?}",
            primitives.len(),
            root.depth(),
            start.elapsed()
        );

        Self { root, primitives }
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl Hittable for Bvh {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        self.root.hit(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.root.bounding_box()
    }

    /// Unweighted mean of every primitive's density.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.primitives.is_empty() {
            return 0.0;
        }

        let weight = 1.0 / self.primitives.len() as f32;
        self.primitives
            .iter()
            .map(|object| weight * object.pdf_value(origin, direction))
            .sum()
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.primitives.is_empty() {
            return Vec3::X;
        }

        let index = random_index(rng, self.primitives.len());
        self.primitives[index].random(origin, rng)
    }
}
