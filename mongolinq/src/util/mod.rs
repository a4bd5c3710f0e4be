#[macro_export]
macro_rules! map {
	($($key:expr => $val:expr),* $(,)?) => {
		std::iter::Iterator::collect(IntoIterator::into_iter([
			$({
				($key, $val)
			},)*
		]))
	};
}

#[macro_export]
macro_rules! set {
	($($val:expr),* $(,)?) => {
		std::iter::Iterator::collect(IntoIterator::into_iter([
			$({
				($val)
			},)*
		]))
	};
}
