/// Enum with possible abort strategies.
/// These strategies specify when the assign/update loop of a running k-means calculation stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AbortStrategy {
	/// This strategy stops the calculation directly after the first assignment pass that did not move
	/// a single point to another cluster (fixed point). There is no iteration limit.
	#[default]
	FixedPoint,
	/// Same as [`AbortStrategy::FixedPoint`], but additionally stops after **max_iter** assignment passes,
	/// whether or not a fixed point was reached.
	/// ## Fields:
	/// - **max_iter**: Maximum amount of assignment passes
	FixedPointOrMaxIterations { max_iter: usize }
}
impl AbortStrategy {
	pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic> {
		match *self {
			AbortStrategy::FixedPoint => Box::new(FixedPointLogic),
			AbortStrategy::FixedPointOrMaxIterations{max_iter} => Box::new(FixedPointOrMaxIterationsLogic {
				max_iter,
				iteration: 0
			})
		}
	}
}

pub(crate) trait AbortStrategyLogic {
	/// Function that has to be called once an assignment pass ended.
	/// ## Arguments
	/// - **changed**: Amount of points that changed their cluster during the pass
	/// ## Returns
	/// - **true** if the calculation should continue (update centroids, then run the next pass)
	/// - **false** if the calculation should stop
	fn next(&mut self, changed: usize) -> bool;
}


pub(crate) struct FixedPointLogic;
impl AbortStrategyLogic for FixedPointLogic {
	fn next(&mut self, changed: usize) -> bool {
		changed > 0
	}
}


pub(crate) struct FixedPointOrMaxIterationsLogic {
	max_iter: usize,
	iteration: usize
}
impl AbortStrategyLogic for FixedPointOrMaxIterationsLogic {
	fn next(&mut self, changed: usize) -> bool {
		self.iteration += 1;
		changed > 0 && self.iteration < self.max_iter
	}
}
