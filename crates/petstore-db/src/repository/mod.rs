//! # Repositories
//!
//! One module per record kind. Each binds its record to the entity store
//! (`impl Entity`) and adds the finders specific to that kind.
//!
//! | Module       | Record      | Extra finders                       |
//! |--------------|-------------|-------------------------------------|
//! | `category`   | `Category`  |                                     |
//! | `product`    | `Product`   | `find_all_in_category`              |
//! | `item`       | `Item`      | `find_all_in_product`, `search`     |
//! | `customer`   | `Customer`  |                                     |
//! | `order`      | `Order`     | `find_all_for_customer`             |
//! | `order_line` | `OrderLine` | `find_all_in_order`                 |

pub mod category;
pub mod customer;
pub mod item;
pub mod order;
pub mod order_line;
pub mod product;
