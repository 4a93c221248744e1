use argindex::{
    group_by_mapping, group_entities, group_entities_with, group_equal, Entity, MergePolicy,
};

/// Prints the three groupings for a few small inputs.
///
/// Usage: cargo run --example groups
fn main() {
    let numbers = [1, -1, 2, -1, 1];
    println!("input: {:?}", numbers);

    println!("\n=== Equal items ===");
    for positions in group_equal(numbers, false) {
        println!("{:>3} at {:?}", numbers[positions[0]], positions);
    }

    println!("\n=== Opposites ===");
    let opposites = group_by_mapping(numbers, |n| -n, false);
    for (number, entry) in opposites.iter() {
        println!(
            "{:>3}: equal {:?}, matched {:?}",
            number,
            entry.equal_positions(),
            entry.matched_positions()
        );
    }

    println!("\n=== Entities ===");
    let names = [
        Entity::Multi(vec!["Robert", "Bob"]),
        Entity::single("Alice"),
        Entity::Multi(vec!["Bobby", "Bob"]),
        Entity::Multi(vec!["Al", "Alice"]),
        Entity::single("Carol"),
    ];
    for positions in group_entities(names.clone(), false) {
        let members: Vec<&[&str]> = positions.iter().map(|&p| names[p].items()).collect();
        println!("{:?} -> {:?}", positions, members);
    }

    println!("\n=== First-match vs transitive ===");
    let overlaps = [vec![1, 2], vec![3, 4], vec![2, 3]];
    println!(
        "first-match: {:?}",
        group_entities_with(overlaps.clone(), MergePolicy::FirstMatch, false)
    );
    println!(
        "transitive:  {:?}",
        group_entities_with(overlaps, MergePolicy::Transitive, false)
    );
}
