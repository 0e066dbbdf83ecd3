use super::{FloatT, ScalarMath};

impl<T: FloatT> ScalarMath for T {
    type T = T;
    fn clip(&self, min_thresh: T, max_thresh: T, min_new: T, max_new: T) -> T {
        if *self < min_thresh {
            min_new
        } else if *self > max_thresh {
            max_new
        } else {
            *self
        }
    }
}

#[test]
fn test_clip() {
    assert_eq!((0.5f64).clip(1.0, 2.0, 1.5, 3.0), 1.5);
    assert_eq!((2.5f64).clip(1.0, 2.0, 1.5, 3.0), 3.0);
    assert_eq!((1.2f64).clip(1.0, 2.0, 1.5, 3.0), 1.2);
}
