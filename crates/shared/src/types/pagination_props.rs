//! Property tests for page arithmetic.

use proptest::prelude::*;

use super::pagination::PageRequest;

proptest! {
    #[test]
    fn prop_pages_cover_all_items(limit in 1i64..500, total in 1u64..100_000) {
        let request = PageRequest::new(1, limit).unwrap();
        let pages = request.pages_total(total);
        let limit = limit.unsigned_abs();

        prop_assert!(pages * limit >= total);
        prop_assert!((pages - 1) * limit < total);
    }

    #[test]
    fn prop_pages_do_not_overlap(limit in 1i64..200, total in 0u64..5_000) {
        let pages = PageRequest::new(1, limit).unwrap().pages_total(total);

        let mut covered = 0u64;
        for page in 1..=i64::try_from(pages).unwrap() {
            let request = PageRequest::new(page, limit).unwrap();
            let offset = request.offset();
            prop_assert_eq!(offset, covered);
            covered += request.limit().unwrap().min(total.saturating_sub(offset));
        }
        prop_assert_eq!(covered, total);
    }

    #[test]
    fn prop_unbounded_and_zero_limits_are_one_page(page in 0i64..1_000, total in 0u64..100_000) {
        for limit in [-1, 0] {
            let request = PageRequest::new(page, limit).unwrap();
            prop_assert_eq!(request.pages_total(total), 1);
        }
        prop_assert_eq!(PageRequest::new(page, -1).unwrap().offset(), 0);
    }

    #[test]
    fn prop_page_zero_is_first_page(limit in -1i64..1_000) {
        prop_assert_eq!(
            PageRequest::new(0, limit).unwrap(),
            PageRequest::new(1, limit).unwrap()
        );
    }

    #[test]
    fn prop_invalid_parameters_rejected(page in i64::MIN..0, limit in i64::MIN..-1) {
        prop_assert!(PageRequest::new(page, 10).is_err());
        prop_assert!(PageRequest::new(1, limit).is_err());
    }
}
