#[macro_export]
macro_rules! pretty_assert_eq {
  ($left:expr, $right:expr) => {{
    pretty_assertions::assert_eq!(
      format!("{:#?}", $left).replace("\n", "\u{0085}"),
      format!("{:#?}", $right).replace("\n", "\u{0085}")
    );
  }};
}

/// Like `approx::assert_ulps_eq!`, but prints a readable diff of both sides on failure
#[macro_export]
macro_rules! pretty_assert_ulps_eq {
  ($left:expr, $right:expr $(, $opt:ident = $val:expr)* $(,)?) => {{
    let left = &$left;
    let right = &$right;
    if !approx::ulps_eq!(left, right $(, $opt = $val)*) {
      pretty_assertions::assert_eq!(format!("{:#.17?}", left), format!("{:#.17?}", right));
      // Formatting may hide a difference below the printed precision
      approx::assert_ulps_eq!(left, right $(, $opt = $val)*);
    }
  }};
}
