//! `collision.native`: 2D overlap tests.

use mlua::prelude::*;

pub fn aabb_overlap(a: [f64; 4], b: [f64; 4]) -> bool {
  let [ax, ay, aw, ah] = a;
  let [bx, by, bw, bh] = b;
  ax < bx + bw && bx < ax + aw && ay < by + bh && by < ay + ah
}

pub fn circle_overlap(a: [f64; 3], b: [f64; 3]) -> bool {
  let [x1, y1, r1] = a;
  let [x2, y2, r2] = b;
  let (dx, dy, r) = (x2 - x1, y2 - y1, r1 + r2);
  dx * dx + dy * dy < r * r
}

/// Even-odd rule over a polygon given as `(x, y)` vertices.
pub fn point_in_polygon(x: f64, y: f64, vertices: &[(f64, f64)]) -> bool {
  let mut inside = false;
  let mut j = vertices.len().wrapping_sub(1);
  for (i, &(xi, yi)) in vertices.iter().enumerate() {
    let (xj, yj) = vertices[j];
    if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
      inside = !inside;
    }
    j = i;
  }
  inside
}

fn vertices_from_coords(coords: &[f64]) -> LuaResult<Vec<(f64, f64)>> {
  if coords.len() % 2 != 0 {
    return Err(LuaError::external("polygon coordinates must come in x, y pairs"));
  }
  Ok(coords.chunks_exact(2).map(|c| (c[0], c[1])).collect())
}

pub fn open(lua: &Lua) -> LuaResult<LuaTable> {
  let module = lua.create_table()?;

  module.set(
    "aabb_overlap",
    lua.create_function(|_, (ax, ay, aw, ah, bx, by, bw, bh): (f64, f64, f64, f64, f64, f64, f64, f64)| {
      Ok(aabb_overlap([ax, ay, aw, ah], [bx, by, bw, bh]))
    })?,
  )?;

  module.set(
    "circle_overlap",
    lua.create_function(|_, (x1, y1, r1, x2, y2, r2): (f64, f64, f64, f64, f64, f64)| {
      Ok(circle_overlap([x1, y1, r1], [x2, y2, r2]))
    })?,
  )?;

  module.set(
    "point_in_polygon",
    lua.create_function(|_, (x, y, coords): (f64, f64, Vec<f64>)| {
      Ok(point_in_polygon(x, y, &vertices_from_coords(&coords)?))
    })?,
  )?;

  Ok(module)
}
