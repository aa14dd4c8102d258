//! Tests for the mapping facade.

use std::sync::Arc;

use chrono::NaiveDate;
use remap_core::{FieldRenames, MapError, Mapper, shape};

#[derive(Debug, Clone, Default, PartialEq)]
struct Source {
    id: i32,
    name: String,
    dob: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
struct Target {
    id: i32,
    name: String,
    dob_formatted: String,
    status: String,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            dob_formatted: String::new(),
            status: "new".to_string(),
        }
    }
}

shape!(Source { id: i32, name: String, dob: NaiveDate });
shape!(Target { id: i32, name: String, dob_formatted: String, status: String });

#[derive(Debug, Clone, Default, PartialEq)]
struct Address {
    street: String,
    zip: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct AddressDto {
    street: String,
    zip: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Entity {
    id: i64,
    address: Address,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct EntityDto {
    id: i64,
    address: AddressDto,
}

shape!(Address { street: String, zip: String });
shape!(AddressDto { street: String, zip: String });
shape!(Entity { id: i64, address: Address });
shape!(EntityDto { id: i64, address: AddressDto });

#[derive(Debug, Clone, Default, PartialEq)]
struct Person {
    full_name: String,
    age: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct PersonDto {
    name: String,
    age: u32,
}

shape!(Person { full_name: String, age: u32 });
shape!(PersonDto { name: String, age: u32 });

#[derive(Debug, Clone, Default, PartialEq)]
struct Ticket {
    id: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TicketDto {
    id: String,
}

shape!(Ticket { id: i32 });
shape!(TicketDto { id: String });

fn john() -> Source {
    Source {
        id: 1,
        name: "John".to_string(),
        dob: NaiveDate::from_ymd_opt(1990, 5, 15).unwrap_or_default(),
    }
}

fn entity() -> Entity {
    Entity {
        id: 42,
        address: Address {
            street: "1 Main St".to_string(),
            zip: "12345".to_string(),
        },
    }
}

#[test]
fn map_requires_registration() {
    let mapper = Mapper::new();
    let err = mapper.map::<Source, Target>(&john()).unwrap_err();
    assert_eq!(
        err,
        MapError::MappingNotFound {
            source_type: "Source".to_string(),
            destination_type: "Target".to_string(),
        }
    );
}

#[test]
fn renamed_field_uses_type_converter() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.add_type_converter(|date: &NaiveDate| date.format("%Y-%m-%d").to_string());
    mapper.auto_map_with::<Source, Target>(&FieldRenames::new().rename("dob_formatted", "dob"))?;

    let target: Target = mapper.map(&john())?;
    assert_eq!(
        target,
        Target {
            id: 1,
            name: "John".to_string(),
            dob_formatted: "1990-05-15".to_string(),
            status: "new".to_string(),
        }
    );
    Ok(())
}

#[test]
fn unmapped_fields_keep_destination_defaults() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.auto_map::<Source, Target>()?;

    let target: Target = mapper.map(&john())?;
    assert_eq!(target.id, 1);
    assert_eq!(target.name, "John");
    assert_eq!(target.dob_formatted, "");
    assert_eq!(target.status, "new");
    Ok(())
}

#[test]
fn incompatible_field_is_left_at_default() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.auto_map::<Ticket, TicketDto>()?;

    let dto: TicketDto = mapper.map(&Ticket { id: 9 })?;
    assert_eq!(dto, TicketDto::default());
    Ok(())
}

#[test]
fn auto_map_is_idempotent() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.auto_map::<Entity, EntityDto>()?;
    let registered = mapper.registry().len();
    let first = mapper.registry().get(&remap_core::ShapePair::of::<Entity, EntityDto>());

    mapper.auto_map::<Entity, EntityDto>()?;
    let second = mapper.registry().get(&remap_core::ShapePair::of::<Entity, EntityDto>());

    assert_eq!(mapper.registry().len(), registered);
    assert!(matches!((first, second), (Some(a), Some(b)) if Arc::ptr_eq(&a, &b)));
    Ok(())
}

#[test]
fn nested_shapes_are_registered_automatically() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.auto_map::<Entity, EntityDto>()?;
    assert!(mapper.is_registered::<Address, AddressDto>());

    let dto: EntityDto = mapper.map(&entity())?;
    assert_eq!(dto.id, 42);
    assert_eq!(dto.address.street, "1 Main St");
    assert_eq!(dto.address.zip, "12345");

    let address: AddressDto = mapper.map(&entity().address)?;
    assert_eq!(address, dto.address);
    Ok(())
}

#[test]
fn type_converter_takes_precedence_over_nested_mapping() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.add_type_converter(|address: &Address| AddressDto {
        street: address.street.to_uppercase(),
        zip: "converted".to_string(),
    });
    mapper.auto_map::<Entity, EntityDto>()?;

    let dto: EntityDto = mapper.map(&entity())?;
    assert_eq!(dto.address.street, "1 MAIN ST");
    assert_eq!(dto.address.zip, "converted");
    // The converter covers the field, so no nested pair is compiled.
    assert!(!mapper.is_registered::<Address, AddressDto>());
    Ok(())
}

#[test]
fn type_converter_takes_precedence_over_existing_mapping() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.add_mapper(|address: &Address| AddressDto {
        street: "from mapper".to_string(),
        zip: address.zip.clone(),
    });
    mapper.add_type_converter(|address: &Address| AddressDto {
        street: address.street.clone(),
        zip: "converted".to_string(),
    });
    assert_eq!(mapper.registry().converter_count(), 1);
    mapper.auto_map::<Entity, EntityDto>()?;

    let dto: EntityDto = mapper.map(&entity())?;
    assert_eq!(dto.address.street, "1 Main St");
    assert_eq!(dto.address.zip, "converted");

    // Direct maps of the pair still use the registered mapping.
    let direct: AddressDto = mapper.map(&entity().address)?;
    assert_eq!(direct.street, "from mapper");
    Ok(())
}

#[test]
fn explicit_mapper_is_reused_for_nested_fields() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.add_mapper(|address: &Address| AddressDto {
        street: format!("{} (checked)", address.street),
        zip: address.zip.clone(),
    });
    mapper.auto_map::<Entity, EntityDto>()?;

    let dto: EntityDto = mapper.map(&entity())?;
    assert_eq!(dto.address.street, "1 Main St (checked)");
    assert!(mapper.plan_summary::<Address, AddressDto>().is_none());
    Ok(())
}

#[test]
fn renames_work_in_both_directions() -> anyhow::Result<()> {
    let renames = FieldRenames::new().rename("name", "full_name");
    let mut mapper = Mapper::new();
    mapper
        .auto_map_with::<Person, PersonDto>(&renames)?
        .auto_map_with::<PersonDto, Person>(&renames.reversed())?;

    let person = Person {
        full_name: "Grace Hopper".to_string(),
        age: 85,
    };
    let dto: PersonDto = mapper.map(&person)?;
    assert_eq!(dto.name, "Grace Hopper");
    assert_eq!(dto.age, 85);

    let back: Person = mapper.map(&dto)?;
    assert_eq!(back, person);
    Ok(())
}

#[test]
fn two_way_auto_map_round_trips_flat_shapes() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.two_way_auto_map::<Address, AddressDto>()?;

    let address = entity().address;
    let dto: AddressDto = mapper.map(&address)?;
    let back: Address = mapper.map(&dto)?;
    assert_eq!(back, address);
    Ok(())
}

#[test]
fn transforms_run_in_registration_order() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper
        .build_auto_map::<Source, Target>()?
        .with_transform(|_: &Source, target: &mut Target| target.name.push_str("-a"))
        .with_transform(|source: &Source, target: &mut Target| {
            target.name.push_str("-b");
            target.dob_formatted = source.dob.to_string();
        })
        .finish()
        .auto_map::<Address, AddressDto>()?;

    let target: Target = mapper.map(&john())?;
    assert_eq!(target.name, "John-a-b");
    assert_eq!(target.dob_formatted, "1990-05-15");
    Ok(())
}

#[test]
fn transforms_only_run_for_the_mapped_pair() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.auto_map::<Entity, EntityDto>()?;
    mapper.with_transform(|_: &Address, dto: &mut AddressDto| dto.zip = "transformed".to_string());

    let nested: EntityDto = mapper.map(&entity())?;
    assert_eq!(nested.address.zip, "12345");

    let direct: AddressDto = mapper.map(&entity().address)?;
    assert_eq!(direct.zip, "transformed");
    Ok(())
}

#[test]
fn ensure_map_registers_on_first_use() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    assert!(!mapper.is_registered::<Entity, EntityDto>());

    let dto: EntityDto = mapper.ensure_map(&entity())?;
    assert_eq!(dto.address.street, "1 Main St");
    assert!(mapper.is_registered::<Entity, EntityDto>());

    let many: Vec<AddressDto> = mapper.ensure_map_many(&[entity().address, Address::default()])?;
    assert_eq!(many.len(), 2);
    assert_eq!(many[1], AddressDto::default());
    Ok(())
}

#[test]
fn map_many_preserves_order() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.auto_map::<Ticket, Ticket>()?;

    let tickets: Vec<Ticket> = (1..=3).map(|id| Ticket { id }).collect();
    let copies: Vec<Ticket> = mapper.map_many(&tickets)?;
    assert_eq!(copies, tickets);

    let err = mapper.map_many::<Ticket, TicketDto>(&tickets).unwrap_err();
    assert!(matches!(err, MapError::MappingNotFound { .. }));
    Ok(())
}

#[test]
fn configured_mapper_maps_concurrently() -> anyhow::Result<()> {
    let mut mapper = Mapper::new();
    mapper.auto_map::<Entity, EntityDto>()?;
    let mapper = Arc::new(mapper);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4_i64)
            .map(|worker| {
                let mapper = Arc::clone(&mapper);
                scope.spawn(move || {
                    (0..50_i64)
                        .map(|n| {
                            let mut source = entity();
                            source.id = worker * 100 + n;
                            mapper
                                .map::<Entity, EntityDto>(&source)
                                .map(|dto| dto.id == source.id)
                        })
                        .collect::<Result<Vec<bool>, MapError>>()
                })
            })
            .collect();
        for handle in handles {
            let results = handle.join().expect("worker panicked").expect("map failed");
            assert!(results.into_iter().all(|matched| matched));
        }
    });
    Ok(())
}
