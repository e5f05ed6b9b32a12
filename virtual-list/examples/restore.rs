// Example: capture the render state of a scrolled list and rebuild it elsewhere.
use virtual_list::{ListOptions, VirtualList};

fn options(count: usize) -> ListOptions {
    ListOptions::new(count, |_| 6)
        .with_viewport_size(24)
        .with_scroll_margin(2)
}

fn main() {
    let mut list = VirtualList::new(options(1_000));
    for i in 0..40 {
        list.measure(i, 4 + (i % 3) as u32);
    }
    list.apply_scroll(180);
    println!("before: offset={} visible={:?}", list.scroll_offset(), list.visible_range());

    let snapshot = list.capture_state();
    drop(list);

    let restored = VirtualList::new(options(1_000).with_restore_state_from(Some(snapshot)));
    println!(
        "after:  offset={} visible={:?}",
        restored.scroll_offset(),
        restored.visible_range()
    );
}
