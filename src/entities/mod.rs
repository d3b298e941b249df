pub mod company;
pub mod currency;
pub mod customer;
pub mod customer_part_to_item;
pub mod customer_payment;
pub mod customer_shipping;
pub mod item;
pub mod opportunity;
pub mod part;
pub mod quote;
pub mod quote_line;
pub mod quote_line_price;
pub mod quote_make_method;
pub mod quote_material;
pub mod quote_operation;
pub mod quote_payment;
pub mod quote_shipment;
pub mod sales_order;
pub mod sales_order_line;
pub mod sales_order_payment;
pub mod sales_order_shipment;
pub mod sales_rfq;
pub mod sales_rfq_line;
pub mod sequence;
