mod wire;

mod binary;
mod lazy;
mod tree;

use crate::{Builder, TagType, Tree};

/// One tree exercising every tag kind, shared by the codec tests.
pub fn sample_tree() -> Tree {
    Builder::new("save")
        .byte("flag", 1)
        .short("depth", -300)
        .int("version", 3)
        .long("seed", 77_000_000_001)
        .float("scale", 1.5)
        .double("spawn_x", -12.25)
        .string("map", "ridges")
        .byte_array("mask", &[1, -2, 3])
        .int_array("counts", &[7, -8])
        .long_array("stamps", &[1, -(1 << 40)])
        .short_array("heights", &[312, -4])
        .float_array("speeds", &[0.5, -1.5])
        .list("spawn", TagType::Double)
        .elem_double(14.5)
        .elem_double(-3.25)
        .end()
        .list("names", TagType::String)
        .elem_string("one")
        .elem_string("two")
        .end()
        .list("items", TagType::Compound)
        .elem_compound()
        .int("id", 1)
        .string("tag", "a")
        .end()
        .elem_compound()
        .int("id", 2)
        .string("tag", "b")
        .end()
        .end()
        .list("grid", TagType::List)
        .elem_list(TagType::Int)
        .elem_int(1)
        .elem_int(2)
        .end()
        .elem_list(TagType::Int)
        .elem_int(3)
        .end()
        .end()
        .list("empty", TagType::End)
        .end()
        .compound("player")
        .double("health", 19.5)
        .compound("pos")
        .int("x", 4)
        .end()
        .end()
        .compound("extras")
        .end()
        .finish()
        .unwrap()
}
