// SPDX-License-Identifier: Apache-2.0

// Depth limits and stack memory strategies
mod common;

#[cfg(test)]
mod tests {
    use super::common::*;
    use ejson::{
        parse_full, parse_with_stack, AllocatorStack, ErrorKind, Frame, FrameStack,
        Parser, StackAllocator, VecStack, INITIAL_CAPACITY,
    };
    use test_log::test;

    fn nested(depth: usize) -> Vec<u8> {
        let mut doc = vec![b'['; depth];
        doc.extend(std::iter::repeat(b']').take(depth));
        doc
    }

    #[test]
    fn test_fixed_stack_accepts_exact_depth() {
        const K: usize = 4;
        let mut slots = [Frame::default(); K];
        let mut rec = Recorder::new();
        parse_full(&mut rec, &nested(K), Some(&mut slots[..])).unwrap();
        assert_eq!(rec.events.len(), 2 * K);
    }

    #[test]
    fn test_fixed_stack_rejects_one_more_level() {
        const K: usize = 4;
        let mut slots = [Frame::default(); K];
        let mut rec = Recorder::new();
        let input = nested(K + 1);
        let error = parse_full(&mut rec, &input, Some(&mut slots[..])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NoStack);
        assert_eq!(error.code(), -1);
        assert_eq!(error.position(), K);

        let mut expected = vec![Event::OpenArray; K];
        expected.push(Event::Error(ErrorKind::NoStack, K, input[K..].to_vec()));
        assert_eq!(rec.events, expected);
    }

    #[test]
    fn test_empty_fixed_stack_still_parses_scalars() {
        let mut empty: [Frame; 0] = [];
        let mut rec = Recorder::new();
        parse_full(&mut rec, b"\"flat\"", Some(&mut empty[..])).unwrap();
        assert_eq!(rec.events, vec![string("flat")]);

        let mut rec = Recorder::new();
        let error = parse_full(&mut rec, b" {}", Some(&mut empty[..])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NoStack);
        assert_eq!(error.position(), 1);
    }

    #[test]
    fn test_objects_and_arrays_share_depth() {
        let mut slots = [Frame::default(); 3];
        let mut rec = Recorder::new();
        parse_full(&mut rec, br#"{"a":[{"b":1}]}"#, Some(&mut slots[..])).unwrap();
        rec.assert_well_nested();

        let mut rec = Recorder::new();
        let result = parse_full(&mut rec, br#"{"a":[{"b":[]}]}"#, Some(&mut slots[..]));
        assert_eq!(result.map_err(|e| e.kind()), Err(ErrorKind::NoStack));
    }

    #[test]
    fn test_vec_stack_handles_deep_nesting() {
        let mut parser = Parser::new();
        let mut rec = Recorder::new();
        parser.parse(&mut rec, &nested(1000)).unwrap();
        assert_eq!(rec.events.len(), 2000);
        rec.assert_well_nested();
        // Memory is handed back once the parse is over
        assert_eq!(parser.stack().capacity(), 0);
    }

    #[test]
    fn test_parse_with_borrowed_stack() {
        let mut stack = VecStack::new();
        let mut rec = Recorder::new();
        parse_with_stack(&mut rec, b"[[1],[2]]", &mut stack).unwrap();
        parse_with_stack(&mut rec, b"{}", &mut stack).unwrap();
        assert_eq!(stack.depth(), 0);
    }

    #[derive(Default)]
    struct Hooks {
        reallocs: Vec<usize>,
        deallocs: usize,
        limit: Option<usize>,
    }

    impl StackAllocator for Hooks {
        type Buffer = Box<[Frame]>;

        fn realloc(&mut self, buffer: &mut Option<Self::Buffer>, min_capacity: usize) -> bool {
            if self.limit.is_some_and(|limit| min_capacity > limit) {
                return false;
            }
            self.reallocs.push(min_capacity);
            let mut grown = vec![Frame::default(); min_capacity];
            if let Some(old) = buffer.as_deref() {
                grown[..old.len()].copy_from_slice(old);
            }
            *buffer = Some(grown.into_boxed_slice());
            true
        }

        fn dealloc(&mut self, _buffer: Self::Buffer) {
            self.deallocs += 1;
        }
    }

    #[test]
    fn test_allocator_hooks_called_once_for_shallow_documents() {
        let mut stack = AllocatorStack::new(Hooks::default());
        let mut rec = Recorder::new();
        parse_with_stack(&mut rec, br#"{"a":[1,2]}"#, &mut stack).unwrap();
        let hooks = stack.into_allocator();
        assert_eq!(hooks.reallocs, vec![INITIAL_CAPACITY]);
        assert_eq!(hooks.deallocs, 1);
    }

    #[test]
    fn test_allocator_growth_preserves_frames() {
        let mut stack = AllocatorStack::new(Hooks::default());
        let mut doc = Vec::new();
        for _ in 0..20 {
            doc.extend_from_slice(br#"{"k":["#);
        }
        for _ in 0..20 {
            doc.extend_from_slice(b"]}");
        }
        let mut rec = Recorder::new();
        parse_with_stack(&mut rec, &doc, &mut stack).unwrap();
        rec.assert_well_nested();
        assert_eq!(stack.allocator().reallocs, vec![16, 32, 64]);
        assert_eq!(stack.allocator().deallocs, 1);
    }

    #[test]
    fn test_allocator_refusal_reports_no_stack() {
        let mut stack = AllocatorStack::new(Hooks {
            limit: Some(INITIAL_CAPACITY),
            ..Default::default()
        });
        let mut rec = Recorder::new();
        let input = nested(INITIAL_CAPACITY + 1);
        let error = parse_with_stack(&mut rec, &input, &mut stack).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NoStack);
        assert_eq!(error.position(), INITIAL_CAPACITY);
        assert_eq!(stack.allocator().deallocs, 1);
    }

    #[test]
    fn test_allocator_refusing_initial_request() {
        let mut stack = AllocatorStack::new(Hooks {
            limit: Some(0),
            ..Default::default()
        });
        let mut rec = Recorder::new();
        let error = parse_with_stack(&mut rec, b"1", &mut stack).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NoStack);
        assert_eq!(error.position(), 0);
        assert_eq!(stack.allocator().deallocs, 0);
        assert_eq!(rec.events, vec![Event::Error(ErrorKind::NoStack, 0, b"1".to_vec())]);
    }
}
